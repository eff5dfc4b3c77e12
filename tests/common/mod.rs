//! Shared helpers for the web API tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use product_portal::web::{create_health_router, create_router, AppState};
use product_portal::{
    Database, NewProduct, NewUser, ProductRepository, ProductRole, StaticCredentials,
    UserRepository,
};
use serde_json::{json, Value};

/// Create an in-memory database seeded with:
/// - `alice`: editor on the `admin` product
/// - `bob`: viewer on the `user` product
/// - `carol`: no grants
pub async fn seeded_database() -> Database {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let users = UserRepository::new(db.pool());
    let products = ProductRepository::new(db.pool());

    let admin = products
        .create(&NewProduct::new("admin").with_description("Administration"))
        .await
        .unwrap();
    let user = products.create(&NewProduct::new("user")).await.unwrap();

    let alice = users.create(&NewUser::new("alice")).await.unwrap();
    products
        .grant(admin.id, alice.id, ProductRole::Editor)
        .await
        .unwrap();

    let bob = users.create(&NewUser::new("bob")).await.unwrap();
    products
        .grant(user.id, bob.id, ProductRole::Viewer)
        .await
        .unwrap();

    users.create(&NewUser::new("carol")).await.unwrap();

    db
}

/// Password used by [`login`].
pub const PASSWORD: &str = "secret";

/// App state whose verifier knows every seeded user with [`PASSWORD`].
pub fn app_state(db: Database) -> AppState {
    let credentials = StaticCredentials::new()
        .with("alice", PASSWORD)
        .with("bob", PASSWORD)
        .with("carol", PASSWORD);
    AppState::new(db).with_verifier(Arc::new(credentials))
}

/// Create a test server over the given state.
pub fn create_test_server(state: AppState) -> TestServer {
    let router = create_router(Arc::new(state), &[]).merge(create_health_router());
    TestServer::new(router).expect("Failed to create test server")
}

/// Log in and return the session token.
pub async fn login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["session_id"]
        .as_str()
        .expect("session_id in login response")
        .to_string()
}

/// Authorization header value for a session token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
