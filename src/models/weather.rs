//! Weather collection model.

use super::OwnedResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "Untitled Collection";

/// A saved forecast or historical range for one location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCollection {
    /// UUID (also used as document ID)
    pub id: String,
    pub title: String,
    /// Owner email
    pub user_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<serde_json::Value>,
    /// Weather API payload, stored as-is
    pub weather_data: Option<serde_json::Value>,
    /// Photo URL per day, keyed by date
    #[serde(default)]
    pub photos: BTreeMap<String, String>,
    pub created_at: String,
    pub updated_at: String,
}

impl OwnedResource for WeatherCollection {
    fn owner_email(&self) -> &str {
        &self.user_id
    }
}
