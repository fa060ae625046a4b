// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store with the same shape as the Firestore collections.
//!
//! Documents are kept as JSON values so they go through the same serde
//! representation as Firestore documents.

use crate::db::FieldMatch;
use crate::error::AppError;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

type DocKey = (String, String);

/// Shared in-memory document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    docs: Arc<DashMap<DocKey, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, AppError> {
        self.docs
            .get(&(collection.to_string(), id.to_string()))
            .map(|doc| serde_json::from_value(doc.value().clone()))
            .transpose()
            .map_err(|e| AppError::Database(format!("corrupt {collection}/{id}: {e}")))
    }

    pub fn put<T: Serialize>(&self, collection: &str, id: &str, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc)
            .map_err(|e| AppError::Database(format!("serialize {collection}/{id}: {e}")))?;
        self.docs
            .insert((collection.to_string(), id.to_string()), value);
        Ok(())
    }

    /// Remove a document; missing documents are not an error.
    pub fn remove(&self, collection: &str, id: &str) {
        self.docs.remove(&(collection.to_string(), id.to_string()));
    }

    pub fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        predicate: &FieldMatch,
    ) -> Result<Vec<T>, AppError> {
        self.docs
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .filter(|entry| predicate.matches(entry.value().get(field)))
            .map(|entry| {
                serde_json::from_value(entry.value().clone())
                    .map_err(|e| AppError::Database(format!("corrupt {collection} document: {e}")))
            })
            .collect()
    }
}
