// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! OAuth client secrets and the state signing key are injected as
//! environment variables by the deployment; a `.env` file is honored for
//! local development.

use std::env;
use std::path::PathBuf;

/// Default Google JWKS endpoint for ID token signing keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
/// Default Google OAuth endpoints base (token exchange).
pub const GOOGLE_OAUTH_URL: &str = "https://oauth2.googleapis.com";
/// Default Google userinfo API base.
pub const GOOGLE_API_URL: &str = "https://www.googleapis.com";
/// Default LinkedIn OAuth endpoints base (authorization + token exchange).
pub const LINKEDIN_OAUTH_URL: &str = "https://www.linkedin.com";
/// Default LinkedIn REST API base (userinfo).
pub const LINKEDIN_API_URL: &str = "https://api.linkedin.com";
/// Cloud Storage JSON API base; also the host of public object URLs.
pub const GCS_API_URL: &str = "https://storage.googleapis.com";

/// Where uploaded weather photos end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoStorageKind {
    /// Files written under `upload_dir`, served from `/uploads/photos`.
    Local,
    /// Photo bytes embedded in the record as a base64 data URL.
    Inline,
    /// Objects under `photos/` in a public Cloud Storage bucket.
    Gcs { bucket: String },
}

/// Which document store backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Firestore,
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Google OAuth client ID, also the expected ID token audience
    pub google_client_id: String,
    /// LinkedIn OAuth client ID
    pub linkedin_client_id: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// Public URL of this API (OAuth redirect URIs are built from it)
    pub backend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store: StoreKind,
    pub photo_storage: PhotoStorageKind,
    /// Directory for locally stored photos
    pub upload_dir: PathBuf,
    /// Cloud Storage emulator base URL; uploads skip authentication when set
    pub storage_emulator_host: Option<String>,
    /// Key the rate limiter on `X-Forwarded-For` (only behind a proxy that sets it)
    pub trust_forwarded_for: bool,

    // --- Upstream endpoints (overridable for tests) ---
    pub google_jwks_url: String,
    pub google_oauth_url: String,
    pub google_api_url: String,
    pub linkedin_oauth_url: String,
    pub linkedin_api_url: String,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// LinkedIn OAuth client secret
    pub linkedin_client_secret: String,
    /// HMAC key for the OAuth `state` parameter (raw bytes)
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Config for tests: in-memory store, inline photos, no real endpoints.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            linkedin_client_id: "test_linkedin_id".to_string(),
            frontend_url: "http://localhost:3001".to_string(),
            backend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 3000,
            store: StoreKind::Memory,
            photo_storage: PhotoStorageKind::Inline,
            upload_dir: PathBuf::from("uploads/photos"),
            storage_emulator_host: None,
            trust_forwarded_for: false,
            google_jwks_url: GOOGLE_JWKS_URL.to_string(),
            google_oauth_url: GOOGLE_OAUTH_URL.to_string(),
            google_api_url: GOOGLE_API_URL.to_string(),
            linkedin_oauth_url: LINKEDIN_OAUTH_URL.to_string(),
            linkedin_api_url: LINKEDIN_API_URL.to_string(),
            google_client_secret: "test_google_secret".to_string(),
            linkedin_client_secret: "test_linkedin_secret".to_string(),
            oauth_state_key: b"test_state_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store = match env::var("STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            Ok("firestore") | Err(_) => StoreKind::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("STORE", other.to_string())),
        };

        let photo_storage = match env::var("PHOTO_STORAGE").as_deref() {
            Ok("local") | Err(_) => PhotoStorageKind::Local,
            Ok("inline") => PhotoStorageKind::Inline,
            Ok("gcs") => PhotoStorageKind::Gcs {
                bucket: required("GOOGLE_CLOUD_STORAGE_BUCKET")?,
            },
            Ok(other) => return Err(ConfigError::Invalid("PHOTO_STORAGE", other.to_string())),
        };

        Ok(Self {
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            linkedin_client_id: required("LINKEDIN_CLIENT_ID")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            store,
            photo_storage,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/photos")),
            storage_emulator_host: env::var("STORAGE_EMULATOR_HOST")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string()),
            trust_forwarded_for: matches!(
                env::var("TRUST_PROXY").as_deref(),
                Ok("1") | Ok("true")
            ),

            google_jwks_url: env::var("GOOGLE_JWKS_URL")
                .unwrap_or_else(|_| GOOGLE_JWKS_URL.to_string()),
            google_oauth_url: env::var("GOOGLE_OAUTH_URL")
                .unwrap_or_else(|_| GOOGLE_OAUTH_URL.to_string()),
            google_api_url: env::var("GOOGLE_API_URL")
                .unwrap_or_else(|_| GOOGLE_API_URL.to_string()),
            linkedin_oauth_url: env::var("LINKEDIN_OAUTH_URL")
                .unwrap_or_else(|_| LINKEDIN_OAUTH_URL.to_string()),
            linkedin_api_url: env::var("LINKEDIN_API_URL")
                .unwrap_or_else(|_| LINKEDIN_API_URL.to_string()),

            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            linkedin_client_secret: required("LINKEDIN_CLIENT_SECRET")?,
            oauth_state_key: required("OAUTH_STATE_KEY")?.into_bytes(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Single test touches the process environment to avoid races.
        env::set_var("GOOGLE_CLIENT_ID", "google_id");
        env::set_var("GOOGLE_CLIENT_SECRET", " google_secret\n");
        env::set_var("LINKEDIN_CLIENT_ID", "linkedin_id");
        env::set_var("LINKEDIN_CLIENT_SECRET", "linkedin_secret");
        env::set_var("OAUTH_STATE_KEY", "state_key_32_bytes_minimum!!!!!!");
        env::set_var("PHOTO_STORAGE", "inline");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.google_client_id, "google_id");
        assert_eq!(config.google_client_secret, "google_secret");
        assert_eq!(config.photo_storage, PhotoStorageKind::Inline);
        assert_eq!(config.linkedin_api_url, LINKEDIN_API_URL);
        assert!(!config.trust_forwarded_for);

        env::set_var("PHOTO_STORAGE", "bucket");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PHOTO_STORAGE", _))
        ));

        env::set_var("PHOTO_STORAGE", "gcs");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("GOOGLE_CLOUD_STORAGE_BUCKET"))
        ));

        env::set_var("GOOGLE_CLOUD_STORAGE_BUCKET", "gifcast-photos");
        env::set_var("TRUST_PROXY", "true");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(
            config.photo_storage,
            PhotoStorageKind::Gcs {
                bucket: "gifcast-photos".to_string()
            }
        );
        assert!(config.trust_forwarded_for);

        env::remove_var("PHOTO_STORAGE");
        env::remove_var("GOOGLE_CLOUD_STORAGE_BUCKET");
        env::remove_var("TRUST_PROXY");
    }
}
