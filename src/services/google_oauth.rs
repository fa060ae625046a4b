// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client for the sign-in flow.

use crate::config::Config;
use crate::error::AppError;
use serde::Deserialize;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.profile \
                                 https://www.googleapis.com/auth/userinfo.email openid";

/// Tokens returned by the code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    /// ID token; this is what the frontend later presents as its bearer token.
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response of the v3 userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    oauth_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleOAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            oauth_url: config.google_oauth_url.trim_end_matches('/').to_string(),
            api_url: config.google_api_url.trim_end_matches('/').to_string(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
        }
    }

    /// Consent-screen URL with offline access and a forced consent prompt.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?\
             access_type=offline&\
             prompt=consent&\
             response_type=code&\
             client_id={}&\
             redirect_uri={}&\
             scope={}&\
             state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(GOOGLE_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleTokens, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Google token request failed: {e}")))?;

        check_json(response, "Google token exchange").await
    }

    /// Fetch the signed-in user's profile.
    pub async fn userinfo(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let response = self
            .http
            .get(format!("{}/oauth2/v3/userinfo", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Google userinfo request failed: {e}")))?;

        check_json(response, "Google userinfo").await
    }
}

async fn check_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!("{what} HTTP {status}: {body}")));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("{what} returned invalid JSON: {e}")))
}
