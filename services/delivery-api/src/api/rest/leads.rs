//! Lead endpoints: public capture plus MASTER-only management

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_common::LeadId;
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::lead::{CaptureLeadCommand, ConvertLeadCommand, ListLeadsQuery};

#[derive(Debug, Deserialize)]
pub struct CaptureLeadRequest {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
}

pub async fn capture(
    State(state): State<AppState>,
    Json(body): Json<CaptureLeadRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lead = state
        .leads
        .handle(CaptureLeadCommand {
            company_name: body.company_name,
            contact_name: body.contact_name,
            email: body.email,
            phone: body.phone,
            message: body.message,
            source: body.source,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .leads
        .execute(ListLeadsQuery {
            actor: claims.actor()?,
            pagination: params.pagination(),
        })
        .await?;

    Ok(Json(page))
}

pub async fn convert(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let lead_id = LeadId::from_uuid(path_uuid(&id, "lead")?);

    state
        .leads
        .handle(ConvertLeadCommand {
            actor: claims.actor()?,
            lead_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
