//! Dashboard CRUD endpoints: access control per role and per route

mod common;

use axum::http::StatusCode;
use common::*;
use dealerdesk::auth::models::Role;
use serde_json::json;

fn customer_payload() -> serde_json::Value {
    json!({
        "first_name": "Ana",
        "last_name": "Silva",
        "date_of_birth": "1990-05-01",
        "phone": "+55 11 99999-0000",
        "email": "ana@example.com",
        "address": "Rua A, 10",
        "document": "123.456.789-00"
    })
}

fn proposal_payload() -> serde_json::Value {
    json!({
        "customer_name": "Carlos",
        "customer_surname": "Santos",
        "date_of_birth": "1985-03-12",
        "document": "987.654.321-00",
        "is_married": true,
        "address": "Av. B, 200",
        "proposal_value": 45000.0
    })
}

#[tokio::test]
async fn test_catalog_is_public() {
    let (app, _) = test_app();

    let response = request(&app, "GET", "/api/cars", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", "/api/financing", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_catalog_mutations_require_session() {
    let (app, _) = test_app();

    let response = request(&app, "POST", "/api/cars", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = request(&app, "DELETE", "/api/cars/1", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = request(&app, "DELETE", "/api/financing/p1", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customers_require_session() {
    let (app, store) = test_app();
    seed_account(&store, "Alice", "alice@example.com", "Secret123", Role::User, true).await;

    let response = request(&app, "GET", "/api/customers", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "alice@example.com", "Secret123").await;
    let response = request(&app, "GET", "/api/customers", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_customer_crud_as_writer() {
    let (app, store) = test_app();
    seed_account(&store, "Alice", "alice@example.com", "Secret123", Role::User, true).await;
    let cookie = login(&app, "alice@example.com", "Secret123").await;

    let response = request(
        &app,
        "POST",
        "/api/customers",
        Some(&cookie),
        Some(customer_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let mut updated = customer_payload();
    updated["phone"] = json!("+55 11 98888-0000");
    let response = request(
        &app,
        "PUT",
        &format!("/api/customers/{}", id),
        Some(&cookie),
        Some(updated),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["phone"], json!("+55 11 98888-0000"));

    let response = request(
        &app,
        "DELETE",
        &format!("/api/customers/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "GET",
        &format!("/api/customers/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_readonly_can_read_but_not_write() {
    let (app, store) = test_app();
    seed_account(&store, "Viewer", "viewer@example.com", "Secret123", Role::ReadOnly, true).await;
    let cookie = login(&app, "viewer@example.com", "Secret123").await;

    let response = request(&app, "GET", "/api/customers", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "POST",
        "/api/customers",
        Some(&cookie),
        Some(customer_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_proposal_submission_is_public() {
    let (app, store) = test_app();
    seed_account(&store, "Alice", "alice@example.com", "Secret123", Role::User, true).await;

    let response = request(
        &app,
        "POST",
        "/api/financing-proposals",
        None,
        Some(proposal_payload()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], json!("pending"));
    let id = body["data"]["id"].as_i64().unwrap();

    // Reviewing is dashboard-only
    let response = request(&app, "GET", "/api/financing-proposals", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app, "alice@example.com", "Secret123").await;
    let response = request(
        &app,
        "GET",
        &format!("/api/financing-proposals/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_proposal_rejects_non_positive_value() {
    let (app, _) = test_app();

    let mut payload = proposal_payload();
    payload["proposal_value"] = json!(0.0);
    let response = request(&app, "POST", "/api/financing-proposals", None, Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proposal_review() {
    let (app, store) = test_app();
    seed_account(&store, "Alice", "alice@example.com", "Secret123", Role::User, true).await;

    let response = request(
        &app,
        "POST",
        "/api/financing-proposals",
        None,
        Some(proposal_payload()),
    )
    .await;
    let body = body_json(response).await;
    let id = body["data"]["id"].as_i64().unwrap();

    let cookie = login(&app, "alice@example.com", "Secret123").await;
    let mut review = proposal_payload();
    review["status"] = json!("approved");
    let response = request(
        &app,
        "PUT",
        &format!("/api/financing-proposals/{}", id),
        Some(&cookie),
        Some(review),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], json!("approved"));
}

#[tokio::test]
async fn test_account_management_is_admin_only() {
    let (app, store) = test_app();
    seed_account(&store, "Alice", "alice@example.com", "Secret123", Role::User, true).await;
    seed_account(&store, "Root", "root@example.com", "Secret123", Role::Admin, true).await;

    let response = request(&app, "GET", "/api/users", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let user_cookie = login(&app, "alice@example.com", "Secret123").await;
    let response = request(&app, "GET", "/api/users", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, "root@example.com", "Secret123").await;
    let response = request(&app, "GET", "/api/users", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_creates_and_updates_accounts() {
    let (app, store) = test_app();
    seed_account(&store, "Root", "root@example.com", "Secret123", Role::Admin, true).await;
    let admin_cookie = login(&app, "root@example.com", "Secret123").await;

    let response = request(
        &app,
        "POST",
        "/api/users",
        Some(&admin_cookie),
        Some(json!({
            "name": "Sales",
            "email": "sales@example.com",
            "password": "Secret123",
            "role": "user"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Update without a password keeps the stored one
    let response = request(
        &app,
        "PUT",
        &format!("/api/users/{}", id),
        Some(&admin_cookie),
        Some(json!({
            "name": "Sales Desk",
            "email": "sales@example.com",
            "role": "readonly",
            "active": true
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["role"], json!("readonly"));

    let cookie = login(&app, "sales@example.com", "Secret123").await;
    let response = request(&app, "GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deactivated_account_is_locked_out_of_new_logins() {
    let (app, store) = test_app();
    seed_account(&store, "Root", "root@example.com", "Secret123", Role::Admin, true).await;
    seed_account(&store, "Bob", "bob@example.com", "Secret123", Role::User, true).await;
    let admin_cookie = login(&app, "root@example.com", "Secret123").await;

    let response = request(&app, "GET", "/api/users", Some(&admin_cookie), None).await;
    let body = body_json(response).await;
    let bob_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["email"] == json!("bob@example.com"))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = request(
        &app,
        "PUT",
        &format!("/api/users/{}", bob_id),
        Some(&admin_cookie),
        Some(json!({
            "name": "Bob",
            "email": "bob@example.com",
            "role": "user",
            "active": false
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "bob@example.com", "password": "Secret123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_delete_own_account() {
    let (app, store) = test_app();
    seed_account(&store, "Root", "root@example.com", "Secret123", Role::Admin, true).await;
    let admin_cookie = login(&app, "root@example.com", "Secret123").await;

    let response = request(&app, "GET", "/api/users", Some(&admin_cookie), None).await;
    let body = body_json(response).await;
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    let response = request(
        &app,
        "DELETE",
        &format!("/api/users/{}", id),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
