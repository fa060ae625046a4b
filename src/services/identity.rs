// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maps a verified email to the local user record.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::User;

/// Read-only lookup of registered users.
///
/// Users are only ever created by the sign-in callbacks; a verified token
/// for an email with no record is an authentication failure.
#[derive(Clone)]
pub struct IdentityResolver {
    db: FirestoreDb,
}

impl IdentityResolver {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    pub async fn resolve(&self, email: &str) -> Result<User, AppError> {
        match self.db.find_user_by_email(email).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(email = %email, "Verified identity has no user record");
                Err(AppError::UserNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    #[tokio::test]
    async fn resolve_found_and_missing() {
        let db = FirestoreDb::new_in_memory();
        db.upsert_user(User {
            email: "a@x.com".into(),
            name: None,
            picture: None,
            provider: Provider::Linkedin,
            provider_id: "li".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_login: "2026-01-01T00:00:00.000Z".into(),
        })
        .await
        .unwrap();

        let resolver = IdentityResolver::new(db);
        assert_eq!(resolver.resolve("a@x.com").await.unwrap().provider_id, "li");
        assert!(matches!(
            resolver.resolve("b@x.com").await,
            Err(AppError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn store_failure_is_not_user_not_found() {
        let resolver = IdentityResolver::new(FirestoreDb::new_mock());
        assert!(matches!(
            resolver.resolve("a@x.com").await,
            Err(AppError::Database(_))
        ));
    }
}
