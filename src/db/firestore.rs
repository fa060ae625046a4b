// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (identity records keyed by email)
//! - GIFs (saved GIFs keyed by provider ID)
//! - Weather collections (keyed by UUID)
//!
//! The same handle can be backed by the in-memory store, which is what the
//! tests and `STORE=memory` local runs use.

use crate::db::{collections, document_id, FieldMatch, MemoryStore};
use crate::error::AppError;
use crate::models::{Gif, User, WeatherCollection};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(MemoryStore),
    Offline,
}

/// Document database handle, constructed once and shared through `AppState`.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

fn db_err(e: impl std::fmt::Display) -> AppError {
    AppError::Database(e.to_string())
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore Emulator");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a database handle backed by process memory.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    /// Create an offline handle for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    // ─── Document Primitives ─────────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collection)
                .obj()
                .one(id)
                .await
                .map_err(db_err),
            Backend::Memory(store) => store.get(collection, id),
            Backend::Offline => Err(offline()),
        }
    }

    async fn set_doc<T>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(id)
                    .object(doc)
                    .execute()
                    .await
                    .map_err(db_err)?;
                Ok(())
            }
            Backend::Memory(store) => store.put(collection, id, doc),
            Backend::Offline => Err(offline()),
        }
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(id)
                    .execute()
                    .await
                    .map_err(db_err)?;
                Ok(())
            }
            Backend::Memory(store) => {
                store.remove(collection, id);
                Ok(())
            }
            Backend::Offline => Err(offline()),
        }
    }

    async fn find_docs<T>(
        &self,
        collection: &str,
        field: &'static str,
        predicate: FieldMatch,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .from(collection)
                .filter(move |q| match &predicate {
                    FieldMatch::Eq(value) => q.field(field).eq(value.clone()),
                    FieldMatch::Contains(value) => q.field(field).array_contains(value.clone()),
                })
                .obj()
                .query()
                .await
                .map_err(db_err),
            Backend::Memory(store) => store.find(collection, field, &predicate),
            Backend::Offline => Err(offline()),
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Look up a user by their unique email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, &document_id(email)).await
    }

    /// Create or update a user after a successful sign-in.
    ///
    /// Returns the stored record.
    pub async fn upsert_user(&self, user: User) -> Result<User, AppError> {
        let existing = self.find_user_by_email(&user.email).await?;
        let is_new = existing.is_none();
        let user = user.merge_login(existing);

        self.set_doc(collections::USERS, &document_id(&user.email), &user)
            .await?;

        tracing::info!(
            email = %user.email,
            provider = %user.provider,
            is_new,
            "User record stored"
        );
        Ok(user)
    }

    // ─── GIF Operations ──────────────────────────────────────────

    pub async fn get_gif(&self, id: &str) -> Result<Option<Gif>, AppError> {
        self.get_doc(collections::GIFS, &document_id(id)).await
    }

    /// All GIFs owned by `email`, most recently saved first.
    pub async fn list_gifs_for_user(&self, email: &str) -> Result<Vec<Gif>, AppError> {
        let mut gifs: Vec<Gif> = self
            .find_docs(collections::GIFS, "userId", FieldMatch::Eq(email.to_string()))
            .await?;
        gifs.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(gifs)
    }

    /// GIFs owned by `email` that carry `tag`.
    pub async fn list_gifs_by_tag(&self, email: &str, tag: &str) -> Result<Vec<Gif>, AppError> {
        let mut gifs: Vec<Gif> = self
            .find_docs(collections::GIFS, "tags", FieldMatch::Contains(tag.to_string()))
            .await?;
        gifs.retain(|gif| gif.user_id == email);
        gifs.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(gifs)
    }

    /// Store a GIF document (insert or full overwrite).
    pub async fn set_gif(&self, gif: &Gif) -> Result<(), AppError> {
        self.set_doc(collections::GIFS, &document_id(&gif.id), gif)
            .await
    }

    pub async fn delete_gif(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::GIFS, &document_id(id)).await
    }

    // ─── Weather Collection Operations ───────────────────────────

    pub async fn get_weather_collection(
        &self,
        id: &str,
    ) -> Result<Option<WeatherCollection>, AppError> {
        self.get_doc(collections::WEATHER_COLLECTIONS, &document_id(id))
            .await
    }

    /// All collections owned by `email`, newest first.
    pub async fn list_weather_collections_for_user(
        &self,
        email: &str,
    ) -> Result<Vec<WeatherCollection>, AppError> {
        let mut found: Vec<WeatherCollection> = self
            .find_docs(
                collections::WEATHER_COLLECTIONS,
                "userId",
                FieldMatch::Eq(email.to_string()),
            )
            .await?;
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    /// Store a weather collection document (insert or full overwrite).
    pub async fn set_weather_collection(
        &self,
        collection: &WeatherCollection,
    ) -> Result<(), AppError> {
        self.set_doc(
            collections::WEATHER_COLLECTIONS,
            &document_id(&collection.id),
            collection,
        )
        .await
    }

    pub async fn delete_weather_collection(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::WEATHER_COLLECTIONS, &document_id(id))
            .await
    }
}

fn offline() -> AppError {
    AppError::Database("Database not connected (offline mode)".to_string())
}
