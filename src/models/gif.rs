//! Saved GIF model.

use super::OwnedResource;
use serde::{Deserialize, Serialize};

/// A GIF a user saved from the GIF search API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Gif {
    /// GIF provider ID (also used as document ID)
    pub id: String,
    pub title: String,
    pub url: String,
    /// Preview (still/small) URL
    pub preview: Option<String>,
    /// Owner email
    pub user_id: String,
    pub saved_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Meme caption
    #[serde(default)]
    pub caption: String,
}

impl OwnedResource for Gif {
    fn owner_email(&self) -> &str {
        &self.user_id
    }
}
