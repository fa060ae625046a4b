//! Database layer (Firestore, or an in-memory store for tests and local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

/// Collection names as constants.
pub mod collections {
    /// Users, keyed by email
    pub const USERS: &str = "users";
    /// Saved GIFs, keyed by GIF provider ID
    pub const GIFS: &str = "gifs";
    /// Weather collections, keyed by UUID
    pub const WEATHER_COLLECTIONS: &str = "weather_collections";
}

/// Single-field query predicate.
#[derive(Debug, Clone)]
pub enum FieldMatch {
    /// Field equals the string value.
    Eq(String),
    /// Array field contains the string value.
    Contains(String),
}

impl FieldMatch {
    /// Evaluate against a JSON field value (used by the in-memory store).
    pub fn matches(&self, field: Option<&serde_json::Value>) -> bool {
        match (self, field) {
            (FieldMatch::Eq(want), Some(serde_json::Value::String(have))) => want == have,
            (FieldMatch::Contains(want), Some(serde_json::Value::Array(items))) => items
                .iter()
                .any(|item| item.as_str() == Some(want.as_str())),
            _ => false,
        }
    }
}

/// Encode an externally supplied key into a safe document ID.
///
/// Firestore document IDs may not contain `/`; emails and provider IDs are
/// percent-encoded so any value round-trips.
pub fn document_id(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}
