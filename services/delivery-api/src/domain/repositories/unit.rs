//! Unit repository port

use async_trait::async_trait;
use obra_common::{OwnerId, PagedResult, Pagination, ProjectId, TenantId, UnitId};
use obra_errors::AppResult;

use crate::domain::entities::Unit;

#[async_trait]
pub trait UnitRepository: Send + Sync {
    async fn create(&self, unit: &Unit) -> AppResult<()>;
    async fn update(&self, unit: &Unit) -> AppResult<()>;
    async fn delete(&self, id: &UnitId) -> AppResult<()>;
    async fn find_by_id(&self, id: &UnitId) -> AppResult<Option<Unit>>;

    /// Unit together with the tenant that owns its project, for scoping checks
    async fn find_scoped(&self, id: &UnitId) -> AppResult<Option<(Unit, TenantId)>>;

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Unit>>;

    async fn list_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Unit>>;
}
