// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved GIF routes. All require authentication and ownership.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::{authorize, authorize_owner_path, require_owned};
use crate::models::Gif;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const GIF_NOT_FOUND: &str = "GIF not found";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gifs/save", post(save_gif))
        .route("/gifs/user/{user_id}", get(list_user_gifs))
        .route("/gifs/tag/{tag}", get(list_tagged_gifs))
        .route("/gifs/{id}", delete(delete_gif))
        .route("/gifs/{id}/caption", put(update_caption))
}

/// Body of `POST /gifs/save`.
#[derive(Debug, Deserialize, Validate)]
pub struct SaveGifRequest {
    #[validate(length(min = 1, max = 128))]
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub title: String,
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    #[validate(url)]
    pub preview: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub caption: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CaptionRequest {
    #[validate(length(max = 500))]
    pub caption: String,
}

#[derive(Serialize)]
pub struct GifResponse {
    pub success: bool,
    pub gif: Gif,
}

#[derive(Serialize)]
pub struct GifListResponse {
    pub success: bool,
    pub gifs: Vec<Gif>,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Unwrap a JSON body and run its validation rules, 400 on failure.
pub(crate) fn valid_body<T: Validate>(
    payload: std::result::Result<Json<T>, JsonRejection>,
    failure: &str,
) -> Result<T> {
    let Json(body) = payload
        .map_err(|e| AppError::BadRequest(format!("{failure}: {}", e.body_text())))?;
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("{failure}: {e}")))?;
    Ok(body)
}

/// Save a GIF for the caller, or update the caller's existing copy.
async fn save_gif(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<SaveGifRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GifResponse>)> {
    let req = valid_body(payload, "Failed to save GIF")?;
    let now = now_rfc3339();

    let gif = match state.db.get_gif(&req.id).await? {
        Some(existing) => {
            authorize(&user, &existing)?;
            Gif {
                title: req.title,
                url: req.url,
                preview: req.preview,
                tags: req.tags,
                caption: req.caption,
                updated_at: Some(now),
                ..existing
            }
        }
        None => Gif {
            id: req.id,
            title: req.title,
            url: req.url,
            preview: req.preview,
            user_id: user.email.clone(),
            saved_at: now,
            updated_at: None,
            tags: req.tags,
            caption: req.caption,
        },
    };

    state.db.set_gif(&gif).await?;
    tracing::info!(gif_id = %gif.id, owner = %gif.user_id, "GIF saved");

    Ok((
        StatusCode::CREATED,
        Json(GifResponse { success: true, gif }),
    ))
}

async fn list_user_gifs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<GifListResponse>> {
    authorize_owner_path(&user, &user_id)?;

    let gifs = state.db.list_gifs_for_user(&user.email).await?;
    Ok(Json(GifListResponse {
        success: true,
        gifs,
    }))
}

/// The caller's GIFs carrying a tag.
async fn list_tagged_gifs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(tag): Path<String>,
) -> Result<Json<GifListResponse>> {
    let gifs = state.db.list_gifs_by_tag(&user.email, &tag).await?;
    Ok(Json(GifListResponse {
        success: true,
        gifs,
    }))
}

async fn delete_gif(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let gif = require_owned(&user, state.db.get_gif(&id).await?, GIF_NOT_FOUND)?;

    state.db.delete_gif(&gif.id).await?;
    tracing::info!(gif_id = %gif.id, "GIF deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn update_caption(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CaptionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>> {
    let mut gif = require_owned(&user, state.db.get_gif(&id).await?, GIF_NOT_FOUND)?;
    let req = valid_body(payload, "Failed to update caption")?;

    gif.caption = req.caption;
    gif.updated_at = Some(now_rfc3339());
    state.db.set_gif(&gif).await?;

    Ok(Json(SuccessResponse { success: true }))
}
