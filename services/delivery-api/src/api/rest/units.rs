//! Unit endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_common::{OwnerId, ProjectId, UnitId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::unit::{
    AssignOwnerCommand, CreateUnitCommand, DeleteUnitCommand, GetUnitQuery, ListMyUnitsQuery,
    ListUnitsQuery, UpdateUnitCommand,
};

#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    pub identifier: String,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUnitRequest {
    pub identifier: Option<String>,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub mark_delivered: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignOwnerRequest {
    /// null unassigns the current owner
    pub owner_id: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(project_id): Path<String>,
    Json(body): Json<CreateUnitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = ProjectId::from_uuid(path_uuid(&project_id, "project")?);

    let unit = state
        .units
        .handle(CreateUnitCommand {
            actor: claims.actor()?,
            project_id,
            identifier: body.identifier,
            floor: body.floor,
            area_m2: body.area_m2,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(project_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = ProjectId::from_uuid(path_uuid(&project_id, "project")?);

    let page = state
        .units
        .execute(ListUnitsQuery {
            actor: claims.actor()?,
            project_id,
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
    let unit_id = UnitId::from_uuid(path_uuid(&id, "unit")?);

    let unit = state
        .units
        .execute(GetUnitQuery {
            actor: claims.actor()?,
            unit_id,
        })
        .await?;

    Ok(Json(unit))
}

pub async fn update(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<UpdateUnitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let unit_id = UnitId::from_uuid(path_uuid(&id, "unit")?);

    let unit = state
        .units
        .handle(UpdateUnitCommand {
            actor: claims.actor()?,
            unit_id,
            identifier: body.identifier,
            floor: body.floor,
            area_m2: body.area_m2,
            mark_delivered: body.mark_delivered,
        })
        .await?;

    Ok(Json(unit))
}

pub async fn assign_owner(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<AssignOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let unit_id = UnitId::from_uuid(path_uuid(&id, "unit")?);

    let owner_id = match body.owner_id.as_deref() {
        Some(raw) => Some(OwnerId::from_uuid(path_uuid(raw, "owner")?)),
        None => None,
    };

    let unit = state
        .units
        .handle(AssignOwnerCommand {
            actor: claims.actor()?,
            unit_id,
            owner_id,
        })
        .await?;

    Ok(Json(unit))
}

pub async fn remove(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let unit_id = UnitId::from_uuid(path_uuid(&id, "unit")?);

    state
        .units
        .handle(DeleteUnitCommand {
            actor: claims.actor()?,
            unit_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_mine(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<impl IntoResponse, AppError> {
    let units = state
        .units
        .execute(ListMyUnitsQuery {
            actor: claims.actor()?,
        })
        .await?;

    Ok(Json(units))
}
