//! User model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity provider a user signed in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Linkedin,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User profile stored in Firestore, keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Email address (unique; also used as document ID)
    pub email: String,
    /// Display name
    pub name: Option<String>,
    /// Profile picture URL
    pub picture: Option<String>,
    /// Provider that created the account
    pub provider: Provider,
    /// Subject identifier at that provider
    pub provider_id: String,
    /// When user first signed in
    pub created_at: String,
    /// Last sign-in timestamp
    pub last_login: String,
}

impl User {
    /// Merge a fresh sign-in into an existing record.
    ///
    /// Profile fields and the login timestamp follow the latest sign-in;
    /// creation time and the originating provider are kept.
    pub fn merge_login(self, existing: Option<User>) -> User {
        match existing {
            Some(prev) => User {
                email: prev.email,
                name: self.name.or(prev.name),
                picture: self.picture.or(prev.picture),
                provider: prev.provider,
                provider_id: prev.provider_id,
                created_at: prev.created_at,
                last_login: self.last_login,
            },
            None => self,
        }
    }
}
