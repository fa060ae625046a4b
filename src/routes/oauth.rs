// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google and LinkedIn sign-in routes.
//!
//! Each provider has a request endpoint that hands the frontend an
//! authorization URL, and a callback that exchanges the code, records the
//! user, and redirects back to the frontend with the bearer token the
//! client should present from then on.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Provider, User};
use crate::services::oauth_state;
use crate::time_utils::{now_rfc3339, unix_millis};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/request", post(google_request))
        .route("/oauth", get(google_callback))
        .route("/auth/linkedin/request", post(linkedin_request))
        .route("/auth/linkedin/callback", get(linkedin_callback))
}

#[derive(Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// User details handed to the frontend after sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInUser {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: Provider,
    pub provider_id: String,
    /// Bearer token for API calls: Google ID token or LinkedIn access token.
    pub token: String,
}

fn google_redirect_uri(state: &AppState) -> String {
    format!("{}/oauth", state.config.backend_url.trim_end_matches('/'))
}

fn linkedin_redirect_uri(state: &AppState) -> String {
    format!(
        "{}/auth/linkedin/callback",
        state.config.backend_url.trim_end_matches('/')
    )
}

fn new_state(state: &AppState, provider: Provider) -> Result<String> {
    Ok(oauth_state::issue(
        provider,
        unix_millis(),
        &state.config.oauth_state_key,
    )?)
}

/// Google authorization URL for the frontend to open.
async fn google_request(State(state): State<Arc<AppState>>) -> Result<Json<AuthUrlResponse>> {
    let oauth_state = new_state(&state, Provider::Google)?;
    let url = state
        .google
        .authorization_url(&google_redirect_uri(&state), &oauth_state);

    tracing::info!("Starting Google sign-in");
    Ok(Json(AuthUrlResponse { url }))
}

/// LinkedIn authorization URL for the frontend to open.
async fn linkedin_request(State(state): State<Arc<AppState>>) -> Result<Json<AuthUrlResponse>> {
    let oauth_state = new_state(&state, Provider::Linkedin)?;
    let url = state
        .linkedin
        .authorization_url(&linkedin_redirect_uri(&state), &oauth_state);

    tracing::info!("Starting LinkedIn sign-in");
    Ok(Json(AuthUrlResponse { url }))
}

async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    finish_callback(&state, Provider::Google, params).await
}

async fn linkedin_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    finish_callback(&state, Provider::Linkedin, params).await
}

/// Shared tail of both callbacks: validate, sign in, redirect.
async fn finish_callback(state: &AppState, provider: Provider, params: CallbackParams) -> Response {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return AppError::BadRequest("Authorization code is required".to_string())
            .into_response();
    };

    if let Some(error) = params.error {
        tracing::warn!(provider = %provider, error = %error, "Provider returned an OAuth error");
        return failure_redirect(state, provider);
    }

    let state_ok = params.state.as_deref().map(|s| {
        oauth_state::verify(s, provider, unix_millis(), &state.config.oauth_state_key)
    });
    match state_ok {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            tracing::warn!(provider = %provider, error = %e, "Rejected OAuth state");
            return failure_redirect(state, provider);
        }
        None => {
            tracing::warn!(provider = %provider, "OAuth callback without state");
            return failure_redirect(state, provider);
        }
    }

    let result = match provider {
        Provider::Google => sign_in_google(state, &code).await,
        Provider::Linkedin => sign_in_linkedin(state, &code).await,
    };

    match result {
        Ok(user) => {
            tracing::info!(provider = %provider, email = %user.email, "Sign-in complete");
            success_redirect(state, &user)
        }
        Err(e) => {
            tracing::error!(provider = %provider, error = %e, "Sign-in failed");
            failure_redirect(state, provider)
        }
    }
}

async fn sign_in_google(state: &AppState, code: &str) -> Result<SignedInUser> {
    let tokens = state
        .google
        .exchange_code(code, &google_redirect_uri(state))
        .await?;
    let info = state.google.userinfo(&tokens.access_token).await?;

    let email = info
        .email
        .ok_or_else(|| AppError::Upstream("Google profile has no email".to_string()))?;

    record_user(
        state,
        User {
            email,
            name: info.name,
            picture: info.picture,
            provider: Provider::Google,
            provider_id: info.sub,
            created_at: now_rfc3339(),
            last_login: now_rfc3339(),
        },
        tokens.id_token,
    )
    .await
}

async fn sign_in_linkedin(state: &AppState, code: &str) -> Result<SignedInUser> {
    let access_token = state
        .linkedin
        .exchange_code(code, &linkedin_redirect_uri(state))
        .await?;
    let info = state
        .linkedin
        .userinfo(&access_token)
        .await
        .map_err(|e| AppError::Upstream(format!("LinkedIn userinfo: {e}")))?;

    let email = info
        .email
        .ok_or_else(|| AppError::Upstream("LinkedIn profile has no email".to_string()))?;

    record_user(
        state,
        User {
            email,
            name: info.name,
            picture: info.picture,
            provider: Provider::Linkedin,
            provider_id: info.sub.unwrap_or_default(),
            created_at: now_rfc3339(),
            last_login: now_rfc3339(),
        },
        access_token,
    )
    .await
}

/// Upsert the user and build what the frontend receives.
async fn record_user(state: &AppState, login: User, token: String) -> Result<SignedInUser> {
    let provider = login.provider;
    let provider_id = login.provider_id.clone();
    let stored = state.db.upsert_user(login).await?;

    // The frontend sees the provider it just used, not the one that
    // originally created the account.
    Ok(SignedInUser {
        email: stored.email,
        name: stored.name,
        picture: stored.picture,
        provider,
        provider_id,
        token,
    })
}

fn success_redirect(state: &AppState, user: &SignedInUser) -> Response {
    match serde_json::to_string(user) {
        Ok(json) => Redirect::temporary(&format!(
            "{}?success=true&user={}",
            state.config.frontend_url,
            urlencoding::encode(&json)
        ))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize signed-in user");
            failure_redirect(state, user.provider)
        }
    }
}

fn failure_redirect(state: &AppState, provider: Provider) -> Response {
    let message = match provider {
        Provider::Google => "Failed to authenticate with Google",
        Provider::Linkedin => "Failed to authenticate with LinkedIn",
    };
    Redirect::temporary(&format!(
        "{}?success=false&error={}",
        state.config.frontend_url,
        urlencoding::encode(message)
    ))
    .into_response()
}
