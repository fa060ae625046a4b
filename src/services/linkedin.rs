// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn OpenID Connect client.
//!
//! Handles:
//! - Access token verification through the userinfo endpoint
//! - Authorization code exchange for the sign-in flow

use crate::config::Config;
use crate::error::AppError;
use crate::models::Provider;
use crate::services::verifier::{TokenVerifier, VerifiedClaims, VerifyError};
use async_trait::async_trait;
use serde::Deserialize;

/// Scopes requested during sign-in.
pub const LINKEDIN_SCOPES: &str = "openid profile email";

/// LinkedIn API client.
#[derive(Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

/// Response of `GET /v2/userinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkedInUserInfo {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl LinkedInClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth_url: config.linkedin_oauth_url.trim_end_matches('/').to_string(),
            api_url: config.linkedin_api_url.trim_end_matches('/').to_string(),
            client_id: config.linkedin_client_id.clone(),
            client_secret: config.linkedin_client_secret.clone(),
        }
    }

    /// Authorization URL the browser is sent to.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/oauth/v2/authorization?\
             response_type=code&\
             client_id={}&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            self.oauth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(LINKEDIN_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Fetch the profile behind an access token.
    ///
    /// Any non-2xx answer means LinkedIn does not recognize the token.
    pub async fn userinfo(&self, access_token: &str) -> Result<LinkedInUserInfo, VerifyError> {
        let response = self
            .http
            .get(format!("{}/v2/userinfo", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| VerifyError::Transient(format!("userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VerifyError::Rejected(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| VerifyError::Transient(format!("invalid userinfo JSON: {e}")))
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/v2/accessToken", self.oauth_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("LinkedIn token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "LinkedIn token exchange HTTP {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid LinkedIn token JSON: {e}")))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl TokenVerifier for LinkedInClient {
    fn provider(&self) -> Provider {
        Provider::Linkedin
    }

    async fn verify(&self, token: &str) -> Result<VerifiedClaims, VerifyError> {
        let info = self.userinfo(token).await?;

        Ok(VerifiedClaims {
            subject: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        })
    }
}
