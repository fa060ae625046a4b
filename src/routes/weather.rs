// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weather collection routes, including per-day photo uploads.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::{authorize_owner_path, require_owned};
use crate::models::weather::DEFAULT_TITLE;
use crate::models::WeatherCollection;
use crate::routes::gifs::{valid_body, SuccessResponse};
use crate::services::photos::{UploadedPhoto, MAX_PHOTO_BYTES};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const COLLECTION_NOT_FOUND: &str = "Weather collection not found";
const PHOTO_FIELD: &str = "photo";

/// Room for multipart framing on top of the photo itself.
const PHOTO_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather/save", post(save_collection))
        .route("/weather/user/{user_id}", get(list_user_collections))
        .route(
            "/weather/{id}",
            get(get_collection).delete(delete_collection),
        )
        .route("/weather/{id}/title", put(update_title))
        .route(
            "/weather/{id}/photo/{date}",
            post(upload_photo)
                .delete(remove_photo)
                .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
}

/// Body of `POST /weather/save`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveCollectionRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub weather_data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TitleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

#[derive(Serialize)]
pub struct CollectionResponse {
    pub success: bool,
    pub collection: WeatherCollection,
}

#[derive(Serialize)]
pub struct CollectionListResponse {
    pub success: bool,
    pub collections: Vec<WeatherCollection>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub success: bool,
    pub photo_url: String,
}

async fn save_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<SaveCollectionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CollectionResponse>)> {
    let req = valid_body(payload, "Failed to save weather collection")?;
    let now = now_rfc3339();

    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let collection = WeatherCollection {
        id: uuid::Uuid::new_v4().to_string(),
        title,
        user_id: user.email.clone(),
        start_date: req.start_date,
        end_date: req.end_date,
        location: req.location,
        weather_data: req.weather_data,
        photos: Default::default(),
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.set_weather_collection(&collection).await?;
    tracing::info!(
        collection_id = %collection.id,
        owner = %collection.user_id,
        "Weather collection saved"
    );

    Ok((
        StatusCode::CREATED,
        Json(CollectionResponse {
            success: true,
            collection,
        }),
    ))
}

async fn list_user_collections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<CollectionListResponse>> {
    authorize_owner_path(&user, &user_id)?;

    let collections = state
        .db
        .list_weather_collections_for_user(&user.email)
        .await?;
    Ok(Json(CollectionListResponse {
        success: true,
        collections,
    }))
}

/// Load a collection the caller owns: 404 when missing, 403 otherwise.
async fn load_owned(state: &AppState, user: &AuthUser, id: &str) -> Result<WeatherCollection> {
    let found = state.db.get_weather_collection(id).await?;
    require_owned(user, found, COLLECTION_NOT_FOUND)
}

async fn get_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CollectionResponse>> {
    let collection = load_owned(&state, &user, &id).await?;
    Ok(Json(CollectionResponse {
        success: true,
        collection,
    }))
}

async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let collection = load_owned(&state, &user, &id).await?;

    state.db.delete_weather_collection(&collection.id).await?;
    tracing::info!(collection_id = %collection.id, "Weather collection deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn update_title(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<TitleRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let mut collection = load_owned(&state, &user, &id).await?;
    let req = valid_body(payload, "Failed to update title")?;

    collection.title = req.title;
    collection.updated_at = now_rfc3339();
    state.db.set_weather_collection(&collection).await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Photo dates are calendar days, `YYYY-MM-DD`.
fn check_date(date: &str) -> Result<()> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::BadRequest("Invalid date".to_string()))
}

/// Pull the `photo` field out of a multipart body.
async fn read_photo(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadedPhoto> {
    let no_file = || AppError::BadRequest("No file uploaded".to_string());
    let mut multipart = multipart.map_err(|_| no_file())?;

    loop {
        let field = multipart.next_field().await.map_err(multipart_error)?;
        let Some(field) = field else {
            return Err(no_file());
        };
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        // Reject on the declared type before buffering the body.
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "Only image files are allowed".to_string(),
            ));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadedPhoto {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::BadRequest("File too large".to_string())
    } else {
        AppError::BadRequest(format!("Failed to upload photo: {}", err.body_text()))
    }
}

async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, date)): Path<(String, String)>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoResponse>> {
    let mut collection = load_owned(&state, &user, &id).await?;
    check_date(&date)?;

    let photo = read_photo(multipart).await?;
    tracing::debug!(
        collection_id = %collection.id,
        date = %date,
        content_type = %photo.content_type,
        size = photo.bytes.len(),
        "Photo received"
    );

    let photo_url = state.photos.store(&photo).await?;

    collection.photos.insert(date, photo_url.clone());
    collection.updated_at = now_rfc3339();
    state.db.set_weather_collection(&collection).await?;

    Ok(Json(PhotoResponse {
        success: true,
        photo_url,
    }))
}

async fn remove_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>> {
    let mut collection = load_owned(&state, &user, &id).await?;

    if collection.photos.remove(&date).is_some() {
        collection.updated_at = now_rfc3339();
        state.db.set_weather_collection(&collection).await?;
    }

    Ok(Json(SuccessResponse { success: true }))
}
