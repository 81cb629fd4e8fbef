//! Login, registration and logout endpoints

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use serde::Serialize;

use super::{ApiResponse, AppState};
use crate::auth::models::{AccountInfo, LoginRequest, NewAccount, RegisterRequest, Role};
use crate::auth::{hash_password, normalize_email, verify_credentials, AuthSession};
use crate::error::{Error, Result};

/// Login payload: the account plus the idle interval the dashboard's own
/// countdown should use.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub account: AccountInfo,
    pub idle_timeout_secs: u64,
}

/// POST /api/auth/login
///
/// Verifies the credentials, sets the session cookie and returns the
/// account's public projection. All verification failures surface as the
/// same 401 with no cookie issued.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let info = verify_credentials(state.store.as_ref(), &req.email, &req.password).await?;
    let (_token, cookie) = state.gate.issue_session(&info)?;

    tracing::info!(account = %info.id, "login");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::ok(LoginResponse {
            account: info,
            idle_timeout_secs: state.gate.idle_timeout().as_secs(),
        })),
    ))
}

/// POST /api/auth/register
///
/// Creates an account with a freshly hashed password and the default role.
/// Rejects with 409 when the email is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Error::Validation("Missing required fields".to_string()));
    }
    if !req.email.contains('@') {
        return Err(Error::Validation("Invalid email address".to_string()));
    }

    let email = normalize_email(&req.email);
    if state.store.find_account_by_email(&email).await?.is_some() {
        return Err(Error::EmailInUse(email));
    }

    let account = state
        .store
        .create_account(NewAccount {
            name: req.name.trim().to_string(),
            email,
            password_hash: hash_password(&req.password)?,
            role: Role::User,
            active: true,
        })
        .await?;

    tracing::info!(account = %account.id, "registered");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(account.info()))))
}

/// POST /api/auth/logout
///
/// Revokes the presented token server-side and clears the session cookie.
/// Idempotent: a request without a valid session still gets a 200 and the
/// cookie cleared.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Ok(claims) = state.gate.authenticate(&headers) {
        state.gate.revoke(&claims);
        tracing::info!(account = %claims.sub, "logout");
    }

    (
        [(header::SET_COOKIE, state.gate.clear_cookie())],
        Json(ApiResponse::ok("logged out".to_string())),
    )
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Json<ApiResponse<AccountInfo>>> {
    let account = state
        .store
        .get_account(&session.0.sub)
        .await?
        .ok_or_else(|| Error::NotFound("Account".to_string()))?;
    Ok(Json(ApiResponse::ok(account.info())))
}
