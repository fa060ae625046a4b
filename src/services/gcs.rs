// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Storage uploads for weather photos.
//!
//! Objects are written with the JSON API's simple media upload and made
//! world-readable, so the recorded URL can be loaded straight from the
//! browser.

use crate::config::GCS_API_URL;
use crate::error::AppError;
use gcloud_sdk::{GoogleAuthTokenGenerator, TokenSourceType, GCP_DEFAULT_SCOPES};
use std::fmt;
use tokio::sync::OnceCell;

/// Object name prefix inside the bucket.
pub const OBJECT_PREFIX: &str = "photos";

/// Uploader for one bucket.
pub struct BucketStore {
    http: reqwest::Client,
    bucket: String,
    api_url: String,
    /// `None` against an emulator, which takes unauthenticated requests.
    auth: Option<OnceCell<GoogleAuthTokenGenerator>>,
}

impl fmt::Debug for BucketStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketStore")
            .field("bucket", &self.bucket)
            .field("api_url", &self.api_url)
            .field("authenticated", &self.auth.is_some())
            .finish()
    }
}

impl BucketStore {
    /// Production uploader using application default credentials.
    ///
    /// Credentials are resolved on the first upload, not at startup.
    pub fn new(bucket: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
            api_url: GCS_API_URL.to_string(),
            auth: Some(OnceCell::new()),
        }
    }

    /// Uploader for a storage emulator at `api_url`.
    pub fn new_emulator(bucket: &str, api_url: &str) -> Self {
        tracing::info!(api_url, bucket, "Using Cloud Storage emulator");
        Self {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            auth: None,
        }
    }

    /// Public URL of an object, as served by Cloud Storage.
    pub fn public_url(&self, object: &str) -> String {
        format!("{GCS_API_URL}/{}/{object}", self.bucket)
    }

    async fn authorization(&self) -> Result<Option<String>, AppError> {
        let Some(cell) = &self.auth else {
            return Ok(None);
        };

        let generator = cell
            .get_or_try_init(|| {
                GoogleAuthTokenGenerator::new(
                    TokenSourceType::Default,
                    GCP_DEFAULT_SCOPES.clone(),
                )
            })
            .await
            .map_err(|e| AppError::Storage(format!("credentials: {e}")))?;

        let token = generator
            .create_token()
            .await
            .map_err(|e| AppError::Storage(format!("access token: {e}")))?;
        Ok(Some(token.header_value()))
    }

    /// Upload `bytes` as `photos/<file_name>` and return its public URL.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AppError> {
        let object = format!("{OBJECT_PREFIX}/{file_name}");
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&predefinedAcl=publicRead&name={}",
            self.api_url,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(&object),
        );

        let size = bytes.len();
        let mut request = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(auth) = self.authorization().await? {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload {object}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "upload {object}: {status} {body}"
            )));
        }

        let public_url = self.public_url(&object);
        tracing::info!(
            bucket = %self.bucket,
            object = %object,
            size,
            "Photo uploaded to Cloud Storage"
        );
        Ok(public_url)
    }
}
