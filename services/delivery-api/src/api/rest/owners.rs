//! Owner endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_common::OwnerId;
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::owner::{
    CreateOwnerCommand, DeleteOwnerCommand, GetOwnerQuery, ListOwnersQuery, UpdateOwnerCommand,
};

#[derive(Debug, Deserialize)]
pub struct CreateOwnerRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    #[serde(default)]
    pub create_login: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOwnerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<CreateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner = state
        .owners
        .handle(CreateOwnerCommand {
            actor: claims.actor()?,
            name: body.name,
            email: body.email,
            phone: body.phone,
            cpf: body.cpf,
            create_login: body.create_login,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(owner)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let actor = claims.actor()?;
    let tenant_id = actor.require_tenant()?;

    let page = state
        .owners
        .execute(ListOwnersQuery {
            actor,
            tenant_id,
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
    let owner_id = OwnerId::from_uuid(path_uuid(&id, "owner")?);

    let owner = state
        .owners
        .execute(GetOwnerQuery {
            actor: claims.actor()?,
            owner_id,
        })
        .await?;

    Ok(Json(owner))
}

pub async fn update(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<UpdateOwnerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = OwnerId::from_uuid(path_uuid(&id, "owner")?);

    let owner = state
        .owners
        .handle(UpdateOwnerCommand {
            actor: claims.actor()?,
            owner_id,
            name: body.name,
            phone: body.phone,
            cpf: body.cpf,
        })
        .await?;

    Ok(Json(owner))
}

pub async fn remove(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = OwnerId::from_uuid(path_uuid(&id, "owner")?);

    state
        .owners
        .handle(DeleteOwnerCommand {
            actor: claims.actor()?,
            owner_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
