//! Warranty category and unit-warranty endpoints

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use obra_common::{UnitId, UnitWarrantyId, WarrantyCategoryId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::path_uuid;
use crate::api::AppState;
use crate::application::warranty::{
    CreateCategoryCommand, DeleteCategoryCommand, GenerateWarrantiesCommand, ListCategoriesQuery,
    ListUnitWarrantiesQuery, ReactivateWarrantyCommand, SuspendWarrantyCommand,
    UpdateCategoryCommand,
};

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub term_years: i32,
    pub term_months: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub term_years: Option<i32>,
    pub term_months: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateWarrantiesRequest {
    pub unit_ids: Vec<String>,
    pub category_ids: Vec<String>,
    pub start_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct SuspendWarrantyRequest {
    pub reason: Option<String>,
}

pub async fn create_category(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category = state
        .warranties
        .handle(CreateCategoryCommand {
            actor: claims.actor()?,
            name: body.name,
            description: body.description,
            term_years: body.term_years,
            term_months: body.term_months,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<impl IntoResponse, AppError> {
    let actor = claims.actor()?;
    let tenant_id = actor.require_tenant()?;

    let categories = state
        .warranties
        .execute(ListCategoriesQuery { actor, tenant_id })
        .await?;

    Ok(Json(categories))
}

pub async fn update_category(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let category_id = WarrantyCategoryId::from_uuid(path_uuid(&id, "warranty category")?);

    let category = state
        .warranties
        .handle(UpdateCategoryCommand {
            actor: claims.actor()?,
            category_id,
            name: body.name,
            description: body.description,
            term_years: body.term_years,
            term_months: body.term_months,
        })
        .await?;

    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category_id = WarrantyCategoryId::from_uuid(path_uuid(&id, "warranty category")?);

    state
        .warranties
        .handle(DeleteCategoryCommand {
            actor: claims.actor()?,
            category_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn generate(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<GenerateWarrantiesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let unit_ids = body
        .unit_ids
        .iter()
        .map(|raw| path_uuid(raw, "unit").map(UnitId::from_uuid))
        .collect::<Result<Vec<_>, _>>()?;

    let category_ids = body
        .category_ids
        .iter()
        .map(|raw| path_uuid(raw, "warranty category").map(WarrantyCategoryId::from_uuid))
        .collect::<Result<Vec<_>, _>>()?;

    let created = state
        .warranties
        .handle(GenerateWarrantiesCommand {
            actor: claims.actor()?,
            unit_ids,
            category_ids,
            start_date: body.start_date,
        })
        .await?;

    Ok(Json(serde_json::json!({ "created": created })))
}

pub async fn suspend(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<SuspendWarrantyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let warranty_id = UnitWarrantyId::from_uuid(path_uuid(&id, "warranty")?);

    state
        .warranties
        .handle(SuspendWarrantyCommand {
            actor: claims.actor()?,
            warranty_id,
            reason: body.reason,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reactivate(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let warranty_id = UnitWarrantyId::from_uuid(path_uuid(&id, "warranty")?);

    state
        .warranties
        .handle(ReactivateWarrantyCommand {
            actor: claims.actor()?,
            warranty_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_for_unit(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let unit_id = UnitId::from_uuid(path_uuid(&id, "unit")?);

    let warranties = state
        .warranties
        .execute(ListUnitWarrantiesQuery {
            actor: claims.actor()?,
            unit_id,
        })
        .await?;

    Ok(Json(warranties))
}
