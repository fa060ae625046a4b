// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved GIF route tests, including ownership enforcement.

use axum::http::StatusCode;
use gifcast_api::models::Provider;
use serde_json::json;
use tower::ServiceExt;

mod common;

use common::{body_json, create_test_app, google_id_token, request, seed_user, TestApp};

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

async fn app_with_users() -> TestApp {
    let app = create_test_app().await;
    seed_user(&app.state, ALICE, Provider::Google).await;
    seed_user(&app.state, BOB, Provider::Google).await;
    app
}

fn gif(id: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("GIF {id}"),
        "url": format!("https://media.giphy.com/media/{id}/giphy.gif"),
        "preview": format!("https://media.giphy.com/media/{id}/200w.gif"),
        "tags": tags,
    })
}

async fn save(app: &TestApp, token: &str, body: serde_json::Value) -> axum::response::Response {
    app.router
        .clone()
        .oneshot(request("POST", "/gifs/save", Some(token), Some(body)))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_save_and_list_own_gifs() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);

    let response = save(&app, &alice, gif("g1", &["cats"])).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["gif"]["userId"], ALICE);
    assert_eq!(body["gif"]["caption"], "");

    save(&app, &alice, gif("g2", &[])).await;

    let response = app
        .router
        .clone()
        .oneshot(request("GET", &format!("/gifs/user/{ALICE}"), Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let gifs = body_json(response).await["gifs"].as_array().unwrap().clone();
    assert_eq!(gifs.len(), 2);
}

#[tokio::test]
async fn test_list_other_users_gifs_is_forbidden() {
    let app = app_with_users().await;
    let bob = google_id_token(BOB);

    let response = app
        .router
        .oneshot(request("GET", &format!("/gifs/user/{ALICE}"), Some(&bob), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "Unauthorized access");
}

#[tokio::test]
async fn test_owner_scenario() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);
    let bob = google_id_token(BOB);

    save(&app, &alice, gif("g1", &[])).await;

    // Bob cannot touch Alice's GIF.
    let response = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            "/gifs/g1/caption",
            Some(&bob),
            Some(json!({"caption": "mine now"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", "/gifs/g1", Some(&bob), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Alice can.
    let response = app
        .router
        .clone()
        .oneshot(request(
            "PUT",
            "/gifs/g1/caption",
            Some(&alice),
            Some(json!({"caption": "so good"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let stored = app.state.db.get_gif("g1").await.unwrap().unwrap();
    assert_eq!(stored.caption, "so good");
    assert!(stored.updated_at.is_some());

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", "/gifs/g1", Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.state.db.get_gif("g1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_gif_is_not_found() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", "/gifs/nope", Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "GIF not found");

    let response = app
        .router
        .oneshot(request(
            "PUT",
            "/gifs/nope/caption",
            Some(&alice),
            Some(json!({"caption": "x"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resave_keeps_owner_and_saved_at() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);
    let bob = google_id_token(BOB);

    let first = body_json(save(&app, &alice, gif("g1", &[])).await).await;

    let mut updated = gif("g1", &["dogs"]);
    updated["title"] = json!("Renamed");
    let response = save(&app, &alice, updated).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;
    assert_eq!(second["gif"]["title"], "Renamed");
    assert_eq!(second["gif"]["savedAt"], first["gif"]["savedAt"]);

    // Saving the same id as someone else does not take it over.
    let response = save(&app, &bob, gif("g1", &[])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let stored = app.state.db.get_gif("g1").await.unwrap().unwrap();
    assert_eq!(stored.user_id, ALICE);
    assert_eq!(stored.title, "Renamed");
}

#[tokio::test]
async fn test_save_rejects_invalid_body() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);

    let response = save(&app, &alice, json!({"id": "g1", "url": "not a url"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Failed to save GIF"), "{error}");

    let response = save(&app, &alice, json!({"title": "no id"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_by_tag_only_returns_callers_gifs() {
    let app = app_with_users().await;
    let alice = google_id_token(ALICE);
    let bob = google_id_token(BOB);

    save(&app, &alice, gif("a1", &["cats", "funny"])).await;
    save(&app, &alice, gif("a2", &["dogs"])).await;
    save(&app, &bob, gif("b1", &["cats"])).await;

    let response = app
        .router
        .oneshot(request("GET", "/gifs/tag/cats", Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let gifs = body_json(response).await["gifs"].as_array().unwrap().clone();
    assert_eq!(gifs.len(), 1);
    assert_eq!(gifs[0]["id"], "a1");
}
