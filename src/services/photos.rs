// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage for per-day weather photos.

use crate::config::{Config, PhotoStorageKind};
use crate::error::AppError;
use crate::services::gcs::BucketStore;
use crate::time_utils::unix_millis;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};

/// Upload size limit for a single photo.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;
/// URL prefix the local upload directory is served under.
pub const LOCAL_PUBLIC_PREFIX: &str = "/uploads/photos";

/// A photo received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedPhoto {
    /// Reject non-images and oversized files.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(AppError::BadRequest("File too large".to_string()));
        }
        Ok(())
    }
}

/// Where photos go once accepted.
#[derive(Debug)]
pub enum PhotoStorage {
    /// Written to disk, referenced by a path under [`LOCAL_PUBLIC_PREFIX`].
    Local { dir: PathBuf },
    /// Embedded as a `data:` URL.
    Inline,
    /// Uploaded to a public Cloud Storage bucket.
    Bucket(BucketStore),
}

impl PhotoStorage {
    pub fn from_config(config: &Config) -> Self {
        match &config.photo_storage {
            PhotoStorageKind::Local => PhotoStorage::Local {
                dir: config.upload_dir.clone(),
            },
            PhotoStorageKind::Inline => PhotoStorage::Inline,
            PhotoStorageKind::Gcs { bucket } => match &config.storage_emulator_host {
                Some(host) => PhotoStorage::Bucket(BucketStore::new_emulator(bucket, host)),
                None => PhotoStorage::Bucket(BucketStore::new(bucket)),
            },
        }
    }

    /// Persist a validated photo and return the URL to record.
    pub async fn store(&self, photo: &UploadedPhoto) -> Result<String, AppError> {
        photo.validate()?;

        match self {
            PhotoStorage::Local { dir } => {
                let file_name = generated_file_name(photo.file_name.as_deref());

                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| AppError::Storage(format!("create {}: {e}", dir.display())))?;

                let path = dir.join(&file_name);
                tokio::fs::write(&path, &photo.bytes)
                    .await
                    .map_err(|e| AppError::Storage(format!("write {}: {e}", path.display())))?;

                tracing::info!(
                    path = %path.display(),
                    size = photo.bytes.len(),
                    "Photo written to local storage"
                );
                Ok(format!("{LOCAL_PUBLIC_PREFIX}/{file_name}"))
            }
            PhotoStorage::Inline => Ok(format!(
                "data:{};base64,{}",
                photo.content_type,
                STANDARD.encode(&photo.bytes)
            )),
            PhotoStorage::Bucket(store) => {
                let file_name = generated_file_name(photo.file_name.as_deref());
                store
                    .upload(&file_name, &photo.content_type, photo.bytes.clone())
                    .await
            }
        }
    }
}

/// `photo-<millis>-<random><ext>`, keeping only a short alphanumeric extension.
fn generated_file_name(original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("photo-{}-{}{}", unix_millis(), &random[..12], ext)
}
