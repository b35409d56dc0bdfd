//! Billing history repository port

use async_trait::async_trait;
use obra_common::{BillingEntryId, PagedResult, Pagination, TenantId};
use obra_errors::AppResult;

use crate::domain::entities::BillingEntry;

#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn create(&self, entry: &BillingEntry) -> AppResult<()>;
    async fn find_by_id(&self, id: &BillingEntryId) -> AppResult<Option<BillingEntry>>;
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<BillingEntry>>;
    async fn mark_paid(&self, id: &BillingEntryId) -> AppResult<()>;
}
