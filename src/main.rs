// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gifcast API Server
//!
//! Stores saved GIFs and weather collections for users signed in with
//! Google or LinkedIn.

use gifcast_api::{
    config::{Config, StoreKind},
    db::FirestoreDb,
    default_verifier, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Gifcast API");

    let db = match config.store {
        StoreKind::Firestore => FirestoreDb::new(&config.gcp_project_id).await?,
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            FirestoreDb::new_in_memory()
        }
    };

    let verifier = default_verifier(&config)?;
    tracing::info!(
        providers = ?verifier.providers(),
        "Credential verifier initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db, verifier));

    // Build router
    let app = gifcast_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        address = %addr,
        trust_forwarded_for = config.trust_forwarded_for,
        "Server listening"
    );

    // Peer addresses key the rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gifcast_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
