// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in flow tests against mocked Google and LinkedIn endpoints.

use axum::http::{header, StatusCode};
use gifcast_api::models::Provider;
use gifcast_api::services::oauth_state;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{body_json, create_test_app, request, seed_user, TestApp};

fn fresh_state(app: &TestApp, provider: Provider) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64;
    oauth_state::issue(provider, now, &app.state.config.oauth_state_key).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// Decode the `user` JSON out of a success redirect.
fn redirected_user(location: &str) -> serde_json::Value {
    let encoded = location.split("user=").nth(1).unwrap();
    let decoded = urlencoding::decode(encoded).unwrap();
    serde_json::from_str(&decoded).unwrap()
}

#[tokio::test]
async fn test_google_request_returns_authorization_url() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(request("POST", "/request", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let url = body_json(response).await["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("access_type=offline"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Foauth"));
    assert!(url.contains("state="));
}

#[tokio::test]
async fn test_linkedin_request_returns_authorization_url() {
    let app = create_test_app().await;

    let response = app
        .router
        .oneshot(request("POST", "/auth/linkedin/request", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let url = body_json(response).await["url"].as_str().unwrap().to_string();
    assert!(url.contains("/oauth/v2/authorization?response_type=code"));
    assert!(url.contains("scope=openid%20profile%20email"));
    assert!(url.contains("auth%2Flinkedin%2Fcallback"));
}

#[tokio::test]
async fn test_callback_without_code() {
    let app = create_test_app().await;

    for uri in ["/oauth", "/auth/linkedin/callback?state=abc"] {
        let response = app
            .router
            .clone()
            .oneshot(request("GET", uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body_json(response).await["error"],
            "Authorization code is required"
        );
    }
}

#[tokio::test]
async fn test_google_callback_with_bad_state_redirects_failure() {
    let mut app = create_test_app().await;
    let token = app
        .provider
        .mock("POST", "/token")
        .expect(0)
        .create_async()
        .await;

    // A LinkedIn state must not complete a Google sign-in.
    let state = fresh_state(&app, Provider::Linkedin);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/oauth?code=abc&state={state}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://localhost:3001?success=false&error=Failed%20to%20authenticate%20with%20Google"
    );
    token.assert_async().await;
}

#[tokio::test]
async fn test_google_callback_signs_in() {
    let mut app = create_test_app().await;
    app.provider
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"g-access","id_token":"g-id-token","expires_in":3599}"#)
        .create_async()
        .await;
    app.provider
        .mock("GET", "/oauth2/v3/userinfo")
        .match_header("authorization", "Bearer g-access")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sub":"g-42","email":"carol@example.com","name":"Carol"}"#)
        .create_async()
        .await;

    let state = fresh_state(&app, Provider::Google);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/oauth?code=abc&state={state}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = location(&response);
    assert!(location.starts_with("http://localhost:3001?success=true&user="));

    let user = redirected_user(&location);
    assert_eq!(user["email"], "carol@example.com");
    assert_eq!(user["provider"], "google");
    assert_eq!(user["providerId"], "g-42");
    assert_eq!(user["token"], "g-id-token");

    let stored = app
        .state
        .db
        .find_user_by_email("carol@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name.as_deref(), Some("Carol"));
    assert_eq!(stored.provider, Provider::Google);
}

#[tokio::test]
async fn test_linkedin_callback_updates_existing_user() {
    let mut app = create_test_app().await;
    let existing = seed_user(&app.state, "dave@example.com", Provider::Google).await;

    app.provider
        .mock("POST", "/oauth/v2/accessToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"li-access","expires_in":5183999}"#)
        .create_async()
        .await;
    app.provider
        .mock("GET", "/v2/userinfo")
        .match_header("authorization", "Bearer li-access")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"sub": "li-7", "email": "dave@example.com", "name": "Dave L"}).to_string(),
        )
        .create_async()
        .await;

    let state = fresh_state(&app, Provider::Linkedin);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/auth/linkedin/callback?code=xyz&state={state}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let user = redirected_user(&location(&response));
    assert_eq!(user["token"], "li-access");
    assert_eq!(user["provider"], "linkedin");

    let stored = app
        .state
        .db
        .find_user_by_email("dave@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name.as_deref(), Some("Dave L"));
    assert_eq!(stored.created_at, existing.created_at);
    assert_eq!(stored.provider, Provider::Google);
    assert_ne!(stored.last_login, existing.last_login);
}

#[tokio::test]
async fn test_linkedin_exchange_failure_redirects_failure() {
    let mut app = create_test_app().await;
    app.provider
        .mock("POST", "/oauth/v2/accessToken")
        .with_status(400)
        .with_body(r#"{"error":"invalid_request"}"#)
        .create_async()
        .await;

    let state = fresh_state(&app, Provider::Linkedin);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/auth/linkedin/callback?code=xyz&state={state}"),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).ends_with("error=Failed%20to%20authenticate%20with%20LinkedIn"));
}
