//! Web API Authentication Tests
//!
//! Integration tests for login, logout, the current-user endpoint and the
//! page gate.

mod common;

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::{HeaderName, StatusCode};
use common::{app_state, bearer, create_test_server, login, seeded_database};
use product_portal::auth::{REASON_INVALID_CREDENTIALS, REASON_NO_PRODUCT_ACCESS, REASON_USER_NOT_FOUND};
use product_portal::db::{LoginAttemptRepository, SessionRepository};
use product_portal::web::AppState;
use product_portal::StaticCredentials;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_login_success() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db.clone()));

    let response = server
        .post("/api/auth/login")
        .add_header(HeaderName::from_static("x-forwarded-for"), "203.0.113.7, 10.0.0.1")
        .add_header(USER_AGENT, "integration-test")
        .json(&json!({ "username": "alice", "password": "secret" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let data = &body["data"];
    assert!(data["session_id"].as_str().is_some());
    assert_eq!(data["user"]["username"], "alice");
    assert_eq!(data["user"]["pages"], json!(["home", "admin"]));
    assert_eq!(data["user"]["products"][0]["name"], "admin");
    assert_eq!(data["user"]["products"][0]["role"], "editor");

    let token = data["session_id"].as_str().unwrap();
    let session = SessionRepository::new(db.pool())
        .get_by_token(token)
        .await
        .unwrap()
        .unwrap();
    assert!(session.is_active);
    assert_eq!(session.ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(session.user_agent.as_deref(), Some("integration-test"));
}

#[tokio::test]
async fn test_login_unknown_user() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db.clone()));

    let response = server
        .post("/api/auth/login")
        .add_header(HeaderName::from_static("x-real-ip"), "10.9.8.7")
        .json(&json!({ "username": "mallory", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let attempts = LoginAttemptRepository::new(db.pool())
        .list(None, 10)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].username, "mallory");
    assert_eq!(attempts[0].reason, REASON_USER_NOT_FOUND);
    assert_eq!(attempts[0].ip_address.as_deref(), Some("10.9.8.7"));
}

#[tokio::test]
async fn test_login_without_grant() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db.clone()));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "carol", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let attempts = LoginAttemptRepository::new(db.pool())
        .list(Some("carol"), 10)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].reason, REASON_NO_PRODUCT_ACCESS);
}

#[tokio::test]
async fn test_login_wrong_password_with_verifier() {
    let db = seeded_database().await;
    let verifier = Arc::new(StaticCredentials::new().with("alice", "secret"));
    let server = create_test_server(app_state(db.clone()).with_verifier(verifier));

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let attempts = LoginAttemptRepository::new(db.pool())
        .list(None, 10)
        .await
        .unwrap();
    assert_eq!(attempts[0].reason, REASON_INVALID_CREDENTIALS);

    login(&server, "alice").await;
}

#[tokio::test]
async fn test_login_rejected_by_default_state() {
    let db = seeded_database().await;
    let server = create_test_server(AppState::new(db.clone()));

    server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "secret" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let attempts = LoginAttemptRepository::new(db.pool())
        .list(Some("alice"), 10)
        .await
        .unwrap();
    assert_eq!(attempts[0].reason, REASON_INVALID_CREDENTIALS);
}

#[tokio::test]
async fn test_login_blank_username_rejected() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db.clone()));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "   ", "password": "x" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["username"].is_array());
}

#[tokio::test]
async fn test_login_invalid_json() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "password": "x" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_second_login_replaces_first_session() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db.clone()));

    let first = login(&server, "alice").await;
    let second = login(&server, "alice").await;

    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&first))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&second))
        .await
        .assert_status_ok();

    assert_eq!(
        SessionRepository::new(db.pool())
            .count_active_for("alice")
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_me() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));
    let token = login(&server, "bob").await;

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "bob");
    assert_eq!(body["data"]["pages"], json!(["home"]));
}

#[tokio::test]
async fn test_me_without_token() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));

    server
        .get("/api/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, "Bearer not-a-session")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));
    let token = login(&server, "alice").await;

    let response = server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["logged_out"], true);

    server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let again: Value = server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(again["data"]["logged_out"], false);
}

#[tokio::test]
async fn test_logout_without_token() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));

    server
        .post("/api/auth/logout")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_page_access() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));
    let alice = login(&server, "alice").await;
    let bob = login(&server, "bob").await;

    let response = server
        .get("/api/pages/admin")
        .add_header(AUTHORIZATION, bearer(&alice))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"], json!({ "page": "admin", "allowed": true }));

    server
        .get("/api/pages/home")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/pages/admin")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    server
        .get("/api/pages/settings")
        .add_header(AUTHORIZATION, bearer(&bob))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_access_requires_session() {
    let db = seeded_database().await;
    let server = create_test_server(app_state(db));

    server
        .get("/api/pages/home")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
