//! Tenant endpoints (MASTER only except self-read)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_common::TenantId;
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::tenant::{
    CreateTenantCommand, GetTenantQuery, ListTenantsQuery, SetTenantActiveCommand,
    UpdateTenantCommand,
};

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub slug: String,
    pub cnpj: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = state
        .tenants
        .handle(CreateTenantCommand {
            actor: claims.actor()?,
            name: body.name,
            slug: body.slug,
            cnpj: body.cnpj,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .tenants
        .execute(ListTenantsQuery {
            actor: claims.actor()?,
            pagination: params.pagination(),
        })
        .await?;

    Ok(Json(page))
}

pub async fn get(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&id, "tenant")?);

    let tenant = state
        .tenants
        .execute(GetTenantQuery {
            actor: claims.actor()?,
            tenant_id,
        })
        .await?;

    Ok(Json(tenant))
}

pub async fn update(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&id, "tenant")?);

    let tenant = state
        .tenants
        .handle(UpdateTenantCommand {
            actor: claims.actor()?,
            tenant_id,
            name: body.name,
            cnpj: body.cnpj,
            contact_email: body.contact_email,
            contact_phone: body.contact_phone,
            logo_url: body.logo_url,
        })
        .await?;

    Ok(Json(tenant))
}

pub async fn activate(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    set_active(state, claims, id, true).await
}

pub async fn deactivate(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    set_active(state, claims, id, false).await
}

async fn set_active(
    state: AppState,
    claims: AuthClaims,
    id: String,
    active: bool,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&id, "tenant")?);

    state
        .tenants
        .handle(SetTenantActiveCommand {
            actor: claims.actor()?,
            tenant_id,
            active,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
