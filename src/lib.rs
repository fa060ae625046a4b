// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gifcast API: saved GIFs and weather collections behind Google/LinkedIn sign-in.
//!
//! Every protected request carries a bearer token that is verified against
//! Google first and LinkedIn second, resolved to a local user record, and
//! checked against the owner of whatever it touches.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use middleware::RateLimiter;
use services::{
    CredentialVerifier, GoogleIdTokenVerifier, GoogleOAuthClient, IdentityResolver,
    LinkedInClient, PhotoStorage, TokenVerifier,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub verifier: CredentialVerifier,
    pub identities: IdentityResolver,
    pub google: GoogleOAuthClient,
    pub linkedin: LinkedInClient,
    pub photos: PhotoStorage,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Assemble state around a store and a verifier chain.
    pub fn new(config: Config, db: FirestoreDb, verifier: CredentialVerifier) -> Self {
        Self {
            identities: IdentityResolver::new(db.clone()),
            google: GoogleOAuthClient::new(&config),
            linkedin: LinkedInClient::new(&config),
            photos: PhotoStorage::from_config(&config),
            rate_limiter: RateLimiter::default(),
            verifier,
            db,
            config,
        }
    }
}

/// The production chain: Google ID tokens first, then LinkedIn access tokens.
pub fn default_verifier(config: &Config) -> anyhow::Result<CredentialVerifier> {
    let google: Arc<dyn TokenVerifier> = Arc::new(GoogleIdTokenVerifier::new(config)?);
    let linkedin: Arc<dyn TokenVerifier> = Arc::new(LinkedInClient::new(config));
    Ok(CredentialVerifier::new(vec![google, linkedin]))
}
