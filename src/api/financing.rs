//! Financing partner and proposal endpoints
//!
//! Partners are marketing content: public reads, authenticated mutations
//! with a multipart logo upload. Proposals come in from the public financing
//! form; reviewing and updating them is dashboard-only.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{uploads, ApiResponse, AppState};
use crate::auth::AuthSession;
use crate::error::{Error, Result};
use crate::store::{
    FinancingPartner, FinancingProposal, PartnerChanges, ProposalFields, ProposalStatus,
};

// Partners

/// GET /api/financing
pub async fn list_partners(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FinancingPartner>>>> {
    let partners = state.store.list_partners().await?;
    Ok(Json(ApiResponse::ok(partners)))
}

/// GET /api/financing/{id}
pub async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FinancingPartner>>> {
    let partner = state
        .store
        .get_partner(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Financing partner".to_string()))?;
    Ok(Json(ApiResponse::ok(partner)))
}

/// POST /api/financing
pub async fn create_partner(
    State(state): State<AppState>,
    session: AuthSession,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    session.require_write()?;

    let form = parse_partner_form(multipart, &state).await?;
    if form.name.trim().is_empty() || form.description.trim().is_empty() {
        return Err(Error::Validation("Missing required fields".to_string()));
    }
    let logo = form
        .logo
        .ok_or_else(|| Error::Validation("Logo is required".to_string()))?;

    let partner = state
        .store
        .create_partner(FinancingPartner {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            logo,
            description: form.description,
            additional_info: form.additional_info,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(partner))))
}

/// PUT /api/financing/{id}
pub async fn update_partner(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<FinancingPartner>>> {
    session.require_write()?;

    let form = parse_partner_form(multipart, &state).await?;
    if form.name.trim().is_empty() || form.description.trim().is_empty() {
        return Err(Error::Validation("Missing required fields".to_string()));
    }

    let partner = state
        .store
        .update_partner(
            &id,
            PartnerChanges {
                name: form.name,
                description: form.description,
                additional_info: form.additional_info,
                logo: form.logo,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(partner)))
}

/// DELETE /api/financing/{id}
pub async fn delete_partner(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>> {
    session.require_write()?;

    state.store.delete_partner(&id).await?;
    Ok(Json(ApiResponse::ok("deleted".to_string())))
}

struct PartnerForm {
    name: String,
    description: String,
    additional_info: Option<String>,
    logo: Option<String>,
}

async fn parse_partner_form(mut multipart: Multipart, state: &AppState) -> Result<PartnerForm> {
    let bad = |e: axum::extract::multipart::MultipartError| {
        Error::Validation(format!("Invalid form field: {}", e))
    };

    let mut form = PartnerForm {
        name: String::new(),
        description: String::new(),
        additional_info: None,
        logo: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.map_err(bad)?,
            "description" => form.description = field.text().await.map_err(bad)?,
            "additional_info" => {
                let text = field.text().await.map_err(bad)?;
                if !text.is_empty() {
                    form.additional_info = Some(text);
                }
            }
            "logo" => {
                let filename = field.file_name().unwrap_or("logo").to_string();
                let bytes = field.bytes().await.map_err(bad)?;
                if !bytes.is_empty() {
                    let dir = state.config.server.uploads_dir();
                    form.logo = Some(uploads::save_upload(&dir, &filename, &bytes).await?);
                }
            }
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    Ok(form)
}

// Proposals

/// POST /api/financing-proposals
///
/// Public: this is how the financing form on the marketing site submits.
/// New proposals always start out pending.
pub async fn create_proposal(
    State(state): State<AppState>,
    Json(fields): Json<ProposalFields>,
) -> Result<impl IntoResponse> {
    fields.validate()?;

    let proposal = state.store.create_proposal(fields).await?;
    tracing::info!(proposal = proposal.id, "financing proposal submitted");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(proposal))))
}

/// GET /api/financing-proposals
pub async fn list_proposals(
    State(state): State<AppState>,
    _session: AuthSession,
) -> Result<Json<ApiResponse<Vec<FinancingProposal>>>> {
    let proposals = state.store.list_proposals().await?;
    Ok(Json(ApiResponse::ok(proposals)))
}

/// GET /api/financing-proposals/{id}
pub async fn get_proposal(
    State(state): State<AppState>,
    _session: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<FinancingProposal>>> {
    let proposal = state
        .store
        .get_proposal(id)
        .await?
        .ok_or_else(|| Error::NotFound("Financing proposal".to_string()))?;
    Ok(Json(ApiResponse::ok(proposal)))
}

#[derive(Debug, Deserialize)]
pub struct ProposalUpdateRequest {
    #[serde(flatten)]
    pub fields: ProposalFields,
    pub status: ProposalStatus,
}

/// PUT /api/financing-proposals/{id}
pub async fn update_proposal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
    Json(req): Json<ProposalUpdateRequest>,
) -> Result<Json<ApiResponse<FinancingProposal>>> {
    session.require_write()?;
    req.fields.validate()?;

    let proposal = state
        .store
        .update_proposal(id, req.fields, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(proposal)))
}

/// DELETE /api/financing-proposals/{id}
pub async fn delete_proposal(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<String>>> {
    session.require_write()?;

    state.store.delete_proposal(id).await?;
    Ok(Json(ApiResponse::ok("deleted".to_string())))
}
