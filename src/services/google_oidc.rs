// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google ID token verification.
//!
//! Tokens are RS256 JWTs signed with one of Google's published keys. The
//! key set is fetched from the JWKS endpoint and kept until the
//! Cache-Control max-age of that response runs out; token results
//! themselves are never cached.

use crate::config::Config;
use crate::models::Provider;
use crate::services::verifier::{TokenVerifier, VerifiedClaims, VerifyError};
use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

#[derive(Clone)]
enum KeySource {
    Jwks {
        url: String,
    },
    Static {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Google-issued ID tokens minted for our OAuth client.
pub struct GoogleIdTokenVerifier {
    http_client: reqwest::Client,
    client_id: String,
    keys: KeySource,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl GoogleIdTokenVerifier {
    /// Create a production verifier that fetches and caches Google's JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::build(
            &config.google_client_id,
            KeySource::Jwks {
                url: config.google_jwks_url.clone(),
            },
        )?;

        tracing::info!(
            audience = %verifier.client_id,
            jwks_url = %config.google_jwks_url,
            "Initialized Google ID token verifier"
        );

        Ok(verifier)
    }

    /// Create a verifier with a single static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        client_id: &str,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static key kid must not be empty");
        }

        Self::build(
            client_id,
            KeySource::Static {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(client_id: &str, keys: KeySource) -> anyhow::Result<Self> {
        if client_id.trim().is_empty() {
            anyhow::bail!("Google client ID must not be empty");
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building JWKS HTTP client")?;

        Ok(Self {
            http_client,
            client_id: client_id.to_string(),
            keys,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Validate signature, issuer, audience and expiry of a Google ID token.
    pub async fn verify_id_token(&self, token: &str) -> Result<GoogleIdTokenClaims, VerifyError> {
        let header = decode_header(token)
            .map_err(|e| VerifyError::Rejected(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Rejected(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Rejected("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<GoogleIdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| VerifyError::Rejected(format!("JWT validation failed: {e}")))?;

        Ok(token_data.claims)
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        let url = match &self.keys {
            KeySource::Static {
                kid: static_kid,
                decoding_key,
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(VerifyError::Rejected(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            KeySource::Jwks { url } => url,
        };

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Google rotates keys; an unknown kid may just mean the cache is stale.
        for force_refresh in [false, true] {
            self.refresh_jwks(url, force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(VerifyError::Rejected(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, url: &str, force_refresh: bool) -> Result<(), VerifyError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_url = %url, "Refreshing Google JWKS cache");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| VerifyError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifyError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| VerifyError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid: HashMap<String, Arc<DecodingKey>> = jwks
            .keys
            .into_iter()
            .filter(Jwk::is_rs256_signing_key)
            .filter_map(|jwk| match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => Some((jwk.kid, Arc::new(key))),
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                    None
                }
            })
            .collect();

        if keys_by_kid.is_empty() {
            return Err(VerifyError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        tracing::debug!(
            keys = keys_by_kid.len(),
            ttl_secs = ttl.as_secs(),
            "Google JWKS cache refreshed"
        );

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for GoogleIdTokenVerifier {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn verify(&self, token: &str) -> Result<VerifiedClaims, VerifyError> {
        let claims = self.verify_id_token(token).await?;

        tracing::debug!(
            subject = %claims.sub,
            email = claims.email.as_deref().unwrap_or("<missing>"),
            email_verified = ?claims.email_verified,
            "Google ID token claims"
        );

        Ok(VerifiedClaims {
            subject: Some(claims.sub),
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

impl Jwk {
    fn is_rs256_signing_key(&self) -> bool {
        self.kty == "RSA"
            && !self.kid.trim().is_empty()
            && self.alg.as_deref().map_or(true, |alg| alg == "RS256")
            && self.use_.as_deref().map_or(true, |use_| use_ == "sig")
    }
}

/// Claims of a Google ID token that the app reads.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdTokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: usize,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}
