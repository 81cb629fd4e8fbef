//! Shared helpers for the API integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use dealerdesk::api::{create_router, AppState};
use dealerdesk::auth::hash_password;
use dealerdesk::auth::models::{NewAccount, Role};
use dealerdesk::config::Config;
use dealerdesk::store::{MemoryStore, Store};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Build a router over a fresh in-memory store, returning both so tests can
/// seed data directly.
pub fn test_app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(Config::default(), Arc::new(store.clone()));
    (create_router(state), store)
}

pub async fn seed_account(
    store: &MemoryStore,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    active: bool,
) {
    store
        .create_account(NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            role,
            active,
        })
        .await
        .unwrap();
}

/// Fire one request at the router
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `name=value` part of the session cookie set by the response
pub fn session_cookie(response: &Response<Body>) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response carries no Set-Cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

/// Log in and return the session cookie to send on later requests
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}
