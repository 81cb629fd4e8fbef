//! Account management endpoints (administrators only)
//!
//! Responses only ever carry the public projection; the password is
//! re-hashed when a new one is supplied and left untouched otherwise.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::{ApiResponse, AppState};
use crate::auth::models::{AccountChanges, AccountInfo, NewAccount, Role};
use crate::auth::{hash_password, normalize_email, AuthSession};
use crate::error::{Error, Result};

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<ApiResponse<Vec<AccountInfo>>>> {
    session.require_admin()?;

    let accounts = state.store.list_accounts().await?;
    Ok(Json(ApiResponse::ok(accounts)))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AccountInfo>>> {
    session.require_admin()?;

    let account = state
        .store
        .get_account(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Account".to_string()))?;
    Ok(Json(ApiResponse::ok(account.info())))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse> {
    session.require_admin()?;

    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Validation("Missing required fields".to_string()));
    }

    let account = state
        .store
        .create_account(NewAccount {
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash: hash_password(&req.password)?,
            role: req.role,
            active: req.active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(account.info()))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    /// When absent or empty the stored password hash is kept
    #[serde(default)]
    pub password: Option<String>,
    pub role: Role,
    pub active: bool,
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<AccountInfo>>> {
    session.require_admin()?;

    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(Error::Validation("Missing required fields".to_string()));
    }

    let password_hash = match req.password.as_deref() {
        Some(password) if !password.is_empty() => Some(hash_password(password)?),
        _ => None,
    };

    let account = state
        .store
        .update_account(
            &id,
            AccountChanges {
                name: Some(req.name.trim().to_string()),
                email: Some(normalize_email(&req.email)),
                password_hash,
                role: Some(req.role),
                active: Some(req.active),
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(account.info())))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>> {
    session.require_admin()?;

    if session.0.sub == id {
        return Err(Error::Validation(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.store.delete_account(&id).await?;
    Ok(Json(ApiResponse::ok("deleted".to_string())))
}
