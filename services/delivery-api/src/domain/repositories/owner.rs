//! Owner repository port

use async_trait::async_trait;
use obra_common::{OwnerId, PagedResult, Pagination, TenantId, UserId};
use obra_errors::AppResult;

use crate::domain::entities::Owner;

#[async_trait]
pub trait OwnerRepository: Send + Sync {
    async fn create(&self, owner: &Owner) -> AppResult<()>;
    async fn update(&self, owner: &Owner) -> AppResult<()>;
    async fn delete(&self, id: &OwnerId) -> AppResult<()>;
    async fn find_by_id(&self, id: &OwnerId) -> AppResult<Option<Owner>>;
    async fn find_by_user(&self, user_id: &UserId) -> AppResult<Option<Owner>>;
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Owner>>;
}
