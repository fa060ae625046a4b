// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.
//!
//! Per request: header check, provider verification (Google, then LinkedIn),
//! then local user lookup. Every failure here is a 401; store errors are 500.

use crate::error::AppError;
use crate::models::{Provider, User};
use crate::services::verifier::{extract_bearer_token, token_preview};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated caller, attached to request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Email the token was verified for; the ownership key.
    pub email: String,
    /// Provider that accepted this request's token.
    pub verified_by: Provider,
    /// Local user record.
    pub user: User,
}

/// Run the full authentication pipeline against request headers.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, AppError> {
    let token = extract_bearer_token(headers.get(header::AUTHORIZATION))?;
    tracing::debug!(token = %token_preview(token), "Received bearer token");

    let identity = state.verifier.verify(token).await?;
    let user = state.identities.resolve(&identity.email).await?;

    Ok(AuthUser {
        email: identity.email,
        verified_by: identity.provider,
        user,
    })
}

/// Middleware that requires a verified bearer token for a registered user.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = authenticate(&state, request.headers()).await?;

    tracing::debug!(
        email = %auth_user.email,
        provider = %auth_user.verified_by,
        "Request authenticated"
    );

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}
