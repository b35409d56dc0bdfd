//! Tenant repository port

use async_trait::async_trait;
use obra_common::{PagedResult, Pagination, TenantId};
use obra_errors::AppResult;

use crate::domain::entities::Tenant;

#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create(&self, tenant: &Tenant) -> AppResult<()>;
    async fn update(&self, tenant: &Tenant) -> AppResult<()>;
    async fn find_by_id(&self, id: &TenantId) -> AppResult<Option<Tenant>>;
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>>;
    async fn list(&self, pagination: &Pagination) -> AppResult<PagedResult<Tenant>>;
}
