//! Audit trail endpoints

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use obra_common::TenantId;
use obra_cqrs_core::QueryHandler;
use obra_errors::AppError;

use crate::api::extract::AuthClaims;
use crate::api::rest::{path_uuid, PageParams};
use crate::api::AppState;
use crate::application::audit::ListAuditLogsQuery;

pub async fn list(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(tenant_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let tenant_id = TenantId::from_uuid(path_uuid(&tenant_id, "tenant")?);

    let page = state
        .audit
        .execute(ListAuditLogsQuery {
            actor: claims.actor()?,
            tenant_id,
            pagination: params.pagination(),
        })
        .await?;

    Ok(Json(page))
}
