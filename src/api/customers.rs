//! Customer record endpoints (dashboard only)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use super::{ApiResponse, AppState};
use crate::auth::AuthSession;
use crate::error::{Error, Result};
use crate::store::{Customer, CustomerFields};

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    _session: AuthSession,
) -> Result<Json<ApiResponse<Vec<Customer>>>> {
    let customers = state.store.list_customers().await?;
    Ok(Json(ApiResponse::ok(customers)))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Customer>>> {
    let customer = state
        .store
        .get_customer(id)
        .await?
        .ok_or_else(|| Error::NotFound("Customer".to_string()))?;
    Ok(Json(ApiResponse::ok(customer)))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    session: AuthSession,
    Json(fields): Json<CustomerFields>,
) -> Result<impl IntoResponse> {
    session.require_write()?;
    fields.validate()?;

    let customer = state.store.create_customer(fields).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(customer))))
}

/// PUT /api/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
    Json(fields): Json<CustomerFields>,
) -> Result<Json<ApiResponse<Customer>>> {
    session.require_write()?;
    fields.validate()?;

    let customer = state.store.update_customer(id, fields).await?;
    Ok(Json(ApiResponse::ok(customer)))
}

/// DELETE /api/customers/{id}
pub async fn delete_customer(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>> {
    session.require_write()?;

    state.store.delete_customer(id).await?;
    Ok(Json(ApiResponse::ok("deleted".to_string())))
}
