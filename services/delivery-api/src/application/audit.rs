//! Audit trail queries

use async_trait::async_trait;
use obra_common::{PagedResult, Pagination, TenantId};
use obra_cqrs_core::{Query, QueryHandler};
use obra_errors::AppResult;
use std::sync::Arc;

use crate::domain::entities::AuditLog;
use crate::domain::repositories::AuditLogRepository;

use super::context::Actor;

pub struct ListAuditLogsQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub pagination: Pagination,
}

impl Query for ListAuditLogsQuery {
    type Result = PagedResult<AuditLog>;
}

pub struct AuditHandler {
    audit: Arc<dyn AuditLogRepository>,
}

impl AuditHandler {
    pub fn new(audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl QueryHandler<ListAuditLogsQuery> for AuditHandler {
    async fn execute(&self, query: ListAuditLogsQuery) -> AppResult<PagedResult<AuditLog>> {
        query.actor.ensure_admin_scope(&query.tenant_id)?;

        self.audit
            .list_by_tenant(&query.tenant_id, &query.pagination)
            .await
    }
}
