// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer credential verification across identity providers.
//!
//! A [`CredentialVerifier`] holds an ordered list of [`TokenVerifier`]
//! strategies. Each request's token is offered to them one at a time, in
//! order, and the first strategy that accepts it decides the identity. A
//! rejected token is never retried against the same strategy.

use crate::error::AppError;
use crate::models::Provider;
use async_trait::async_trait;
use axum::http::HeaderValue;
use std::sync::Arc;

/// Claims a provider vouches for after accepting a token.
#[derive(Debug, Clone, Default)]
pub struct VerifiedClaims {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Why a single strategy did not accept a token.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The provider looked at the token and refused it.
    #[error("token rejected: {0}")]
    Rejected(String),
    /// The provider could not be reached or answered garbage.
    #[error("provider unavailable: {0}")]
    Transient(String),
}

/// One provider-specific procedure for turning a bearer token into claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    fn provider(&self) -> Provider;

    async fn verify(&self, token: &str) -> Result<VerifiedClaims, VerifyError>;
}

/// Identity established from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub provider: Provider,
    pub email: String,
}

/// Ordered chain of verification strategies.
#[derive(Clone)]
pub struct CredentialVerifier {
    strategies: Vec<Arc<dyn TokenVerifier>>,
}

impl CredentialVerifier {
    /// Strategies are tried in the given order.
    pub fn new(strategies: Vec<Arc<dyn TokenVerifier>>) -> Self {
        Self { strategies }
    }

    pub fn providers(&self) -> Vec<Provider> {
        self.strategies.iter().map(|s| s.provider()).collect()
    }

    /// Verify a bearer token.
    ///
    /// Failures from individual strategies are logged and swallowed. The
    /// first accepting strategy is authoritative: if its claims carry no
    /// email, the token is invalid and later strategies are not consulted.
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AppError> {
        for strategy in &self.strategies {
            let provider = strategy.provider();
            tracing::debug!(provider = %provider, "Attempting token verification");

            match strategy.verify(token).await {
                Ok(claims) => {
                    let Some(email) = claims.email.filter(|e| !e.trim().is_empty()) else {
                        tracing::warn!(provider = %provider, "Verified token has no email claim");
                        return Err(AppError::InvalidToken);
                    };

                    tracing::debug!(provider = %provider, email = %email, "Token verified");
                    return Ok(VerifiedIdentity { provider, email });
                }
                Err(e) => {
                    tracing::warn!(provider = %provider, error = %e, "Token verification failed");
                }
            }
        }

        tracing::warn!(
            providers = self.strategies.len(),
            "No provider accepted the bearer token"
        );
        Err(AppError::InvalidToken)
    }
}

/// Pull the token out of an `Authorization: <scheme> <token>` header.
///
/// The token is the second space-separated segment; the scheme itself is not
/// interpreted.
pub fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = auth_header.ok_or(AppError::MissingAuthHeader)?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.split(' ').nth(1))
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)
}

/// Short token prefix that is safe to log.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(20).collect();
    format!("{prefix}...")
}
