//! Audit log repository port

use async_trait::async_trait;
use obra_common::{PagedResult, Pagination, TenantId};
use obra_errors::AppResult;

use crate::domain::entities::AuditLog;

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditLog) -> AppResult<()>;
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<AuditLog>>;
}
