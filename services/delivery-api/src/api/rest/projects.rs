//! Project endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use obra_common::{parse_uuid_lenient, PagedResult, ProjectId, TenantId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::project::{
    CreateProjectCommand, DeleteProjectCommand, GetProjectQuery, ListProjectsQuery,
    UpdateProjectCommand,
};
use crate::domain::entities::{Project, ProjectStatus};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsParams {
    pub tenant_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn create(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(body): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let project = state
        .projects
        .handle(CreateProjectCommand {
            actor: claims.actor()?,
            name: body.name,
            address: body.address,
            city: body.city,
            state: body.state,
            delivery_date: body.delivery_date,
            description: body.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<ListProjectsParams>,
) -> Result<impl IntoResponse, AppError> {
    let actor = claims.actor()?;
    let pagination = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .pagination();

    // query filters degrade gracefully: a malformed tenant_id yields no rows
    let tenant_id = match params.tenant_id.as_deref() {
        Some(raw) => match parse_uuid_lenient(raw) {
            Some(id) => TenantId::from_uuid(id),
            None => {
                return Ok(Json(PagedResult::<Project>::new(Vec::new(), 0, &pagination)))
            }
        },
        None => actor.require_tenant()?,
    };

    let page = state
        .projects
        .execute(ListProjectsQuery {
            actor,
            tenant_id,
            pagination,
        })
        .await?;

    Ok(Json(page))
}

pub async fn get(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = ProjectId::from_uuid(path_uuid(&id, "project")?);

    let project = state
        .projects
        .execute(GetProjectQuery {
            actor: claims.actor()?,
            project_id,
        })
        .await?;

    Ok(Json(project))
}

pub async fn update(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = ProjectId::from_uuid(path_uuid(&id, "project")?);

    let status = match body.status.as_deref() {
        Some(raw) => Some(ProjectStatus::parse(raw).ok_or_else(|| {
            AppError::validation(format!("Invalid project status: {}", raw))
        })?),
        None => None,
    };

    let project = state
        .projects
        .handle(UpdateProjectCommand {
            actor: claims.actor()?,
            project_id,
            name: body.name,
            address: body.address,
            city: body.city,
            state: body.state,
            delivery_date: body.delivery_date,
            description: body.description,
            status,
        })
        .await?;

    Ok(Json(project))
}

pub async fn remove(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let project_id = ProjectId::from_uuid(path_uuid(&id, "project")?);

    state
        .projects
        .handle(DeleteProjectCommand {
            actor: claims.actor()?,
            project_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
