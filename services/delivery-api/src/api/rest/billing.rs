//! Billing endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use obra_common::{BillingEntryId, TenantId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::billing::{
    ListBillingQuery, MarkBillingPaidCommand, RecordBillingEntryCommand,
};

#[derive(Debug, Deserialize)]
pub struct RecordBillingRequest {
    pub description: String,
    pub amount_cents: i64,
    pub reference_month: NaiveDate,
    #[serde(default)]
    pub paid: bool,
}

pub async fn record(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(tenant_id): Path<String>,
    Json(body): Json<RecordBillingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&tenant_id, "tenant")?);

    let entry = state
        .billing
        .handle(RecordBillingEntryCommand {
            actor: claims.actor()?,
            tenant_id,
            description: body.description,
            amount_cents: body.amount_cents,
            reference_month: body.reference_month,
            paid: body.paid,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(tenant_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&tenant_id, "tenant")?);

    let page = state
        .billing
        .execute(ListBillingQuery {
            actor: claims.actor()?,
            tenant_id,
            pagination: params.pagination(),
        })
        .await?;

    Ok(Json(page))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry_id = BillingEntryId::from_uuid(path_uuid(&id, "billing entry")?);

    state
        .billing
        .handle(MarkBillingPaidCommand {
            actor: claims.actor()?,
            entry_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
