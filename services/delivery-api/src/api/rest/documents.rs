//! Document endpoints
//!
//! Uploads arrive as multipart form data: metadata fields plus a single
//! `file` part carrying the binary payload.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use obra_common::{parse_uuid_lenient, DocumentId, PagedResult, ProjectId, UnitId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use serde::Deserialize;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::document::{
    AddVersionCommand, DeleteDocumentCommand, GetDocumentQuery, GetDownloadUrlQuery,
    ListDocumentsQuery, ListVersionsQuery, UploadDocumentCommand,
};
use crate::domain::entities::Document;

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    pub project_id: Option<String>,
    pub unit_id: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub version: Option<i32>,
}

/// A single binary part plus its metadata, pulled out of a multipart body
struct FilePart {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct UploadForm {
    project_id: Option<String>,
    unit_id: Option<String>,
    title: Option<String>,
    category: Option<String>,
    file: Option<FilePart>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read file part: {}", e)))?;

                form.file = Some(FilePart {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read field: {}", e)))?;
                match other {
                    "project_id" => form.project_id = Some(value),
                    "unit_id" => form.unit_id = Some(value),
                    "title" => form.title = Some(value),
                    "category" => form.category = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

pub async fn upload(
    State(state): State<AppState>,
    claims: AuthClaims,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = read_upload_form(multipart).await?;

    let project_id = form
        .project_id
        .as_deref()
        .ok_or_else(|| AppError::validation("project_id is required"))?;
    let project_id = ProjectId::from_uuid(path_uuid(project_id, "project")?);

    let unit_id = match form.unit_id.as_deref() {
        Some(raw) => Some(UnitId::from_uuid(path_uuid(raw, "unit")?)),
        None => None,
    };

    let title = form
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::validation("title is required"))?;

    let file = form
        .file
        .ok_or_else(|| AppError::validation("file part is required"))?;

    let document = state
        .documents
        .handle(UploadDocumentCommand {
            actor: claims.actor()?,
            project_id,
            unit_id,
            title,
            category: form.category.unwrap_or_else(|| "GERAL".to_string()),
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn add_version(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let document_id = DocumentId::from_uuid(path_uuid(&id, "document")?);

    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::validation("file part is required"))?;

    let version = state
        .documents
        .handle(AddVersionCommand {
            actor: claims.actor()?,
            document_id,
            file_name: file.file_name,
            content_type: file.content_type,
            bytes: file.bytes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(params): Query<ListDocumentsParams>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .pagination();

    let raw_project = params
        .project_id
        .as_deref()
        .ok_or_else(|| AppError::validation("project_id is required"))?;

    // malformed query filters yield no rows rather than an error
    let project_id = match parse_uuid_lenient(raw_project) {
        Some(id) => ProjectId::from_uuid(id),
        None => return Ok(Json(PagedResult::<Document>::new(Vec::new(), 0, &pagination))),
    };

    let unit_id = match params.unit_id.as_deref() {
        Some(raw) => match parse_uuid_lenient(raw) {
            Some(id) => Some(UnitId::from_uuid(id)),
            None => {
                return Ok(Json(PagedResult::<Document>::new(Vec::new(), 0, &pagination)))
            }
        },
        None => None,
    };

    let page = state
        .documents
        .execute(ListDocumentsQuery {
            actor: claims.actor()?,
            project_id,
            unit_id,
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
    let document_id = DocumentId::from_uuid(path_uuid(&id, "document")?);

    let document = state
        .documents
        .execute(GetDocumentQuery {
            actor: claims.actor()?,
            document_id,
        })
        .await?;

    Ok(Json(document))
}

pub async fn list_versions(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = DocumentId::from_uuid(path_uuid(&id, "document")?);

    let versions = state
        .documents
        .execute(ListVersionsQuery {
            actor: claims.actor()?,
            document_id,
        })
        .await?;

    Ok(Json(versions))
}

pub async fn download_url(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = DocumentId::from_uuid(path_uuid(&id, "document")?);

    let download = state
        .documents
        .execute(GetDownloadUrlQuery {
            actor: claims.actor()?,
            document_id,
            version: params.version,
        })
        .await?;

    Ok(Json(download))
}

pub async fn remove(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document_id = DocumentId::from_uuid(path_uuid(&id, "document")?);

    state
        .documents
        .handle(DeleteDocumentCommand {
            actor: claims.actor()?,
            document_id,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
