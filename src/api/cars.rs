//! Vehicle listing endpoints
//!
//! Catalog reads are public; mutations require a writer session and accept
//! multipart form data so photos can be uploaded alongside the listing
//! fields. On update the photo set is replaced wholesale: retained photos
//! arrive as `existing_photos` text fields, new ones as `photos` file fields.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::path::PathBuf;

use super::{uploads, ApiResponse, AppState};
use crate::auth::AuthSession;
use crate::error::{Error, Result};
use crate::store::{Car, CarFields};

/// GET /api/cars
pub async fn list_cars(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Car>>>> {
    let cars = state.store.list_cars().await?;
    Ok(Json(ApiResponse::ok(cars)))
}

/// GET /api/cars/{id}
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Car>>> {
    let car = state
        .store
        .get_car(id)
        .await?
        .ok_or_else(|| Error::NotFound("Car".to_string()))?;
    Ok(Json(ApiResponse::ok(car)))
}

/// POST /api/cars
pub async fn create_car(
    State(state): State<AppState>,
    session: AuthSession,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    session.require_write()?;

    let (fields, photos) = parse_car_form(multipart, state.config.server.uploads_dir()).await?;
    fields.validate()?;

    let car = state.store.create_car(fields, photos).await?;
    tracing::info!(car = car.id, "car listing created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(car))))
}

/// PUT /api/cars/{id}
pub async fn update_car(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Car>>> {
    session.require_write()?;

    let (fields, photos) = parse_car_form(multipart, state.config.server.uploads_dir()).await?;
    fields.validate()?;

    let car = state.store.update_car(id, fields, photos).await?;
    Ok(Json(ApiResponse::ok(car)))
}

/// DELETE /api/cars/{id}
pub async fn delete_car(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>> {
    session.require_write()?;

    state.store.delete_car(id).await?;
    Ok(Json(ApiResponse::ok("deleted".to_string())))
}

fn bad_field(err: impl std::fmt::Display) -> Error {
    Error::Validation(format!("Invalid form field: {}", err))
}

/// Parse the multipart car form into listing fields plus the final photo set
/// (retained URLs first, then freshly uploaded ones).
async fn parse_car_form(
    mut multipart: Multipart,
    uploads_dir: PathBuf,
) -> Result<(CarFields, Vec<String>)> {
    let mut fields = CarFields::default();
    let mut photos = Vec::new();
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_field)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "model" => fields.model = field.text().await.map_err(bad_field)?,
            "manufacturer" => fields.manufacturer = field.text().await.map_err(bad_field)?,
            "year" => {
                let text = field.text().await.map_err(bad_field)?;
                fields.year = text
                    .parse()
                    .map_err(|_| Error::Validation("Invalid model year".to_string()))?;
            }
            "price" => {
                let text = field.text().await.map_err(bad_field)?;
                fields.price = text
                    .parse()
                    .map_err(|_| Error::Validation("Invalid price".to_string()))?;
            }
            "color" => fields.color = field.text().await.map_err(bad_field)?,
            "license_plate" => fields.license_plate = field.text().await.map_err(bad_field)?,
            "doors" => {
                let text = field.text().await.map_err(bad_field)?;
                fields.doors = text
                    .parse()
                    .map_err(|_| Error::Validation("Invalid door count".to_string()))?;
            }
            "transmission" => fields.transmission = field.text().await.map_err(bad_field)?,
            "category" => fields.category = field.text().await.map_err(bad_field)?,
            "existing_photos" => photos.push(field.text().await.map_err(bad_field)?),
            "photos" => {
                let filename = field.file_name().unwrap_or("photo").to_string();
                let bytes = field.bytes().await.map_err(bad_field)?;
                uploaded.push(uploads::save_upload(&uploads_dir, &filename, &bytes).await?);
            }
            _ => {
                // Unknown fields are dropped rather than rejected so a newer
                // dashboard can talk to an older server.
                let _ = field.bytes().await;
            }
        }
    }

    photos.extend(uploaded);
    Ok((fields, photos))
}
