//! Project repository port

use async_trait::async_trait;
use obra_common::{PagedResult, Pagination, ProjectId, TenantId};
use obra_errors::AppResult;

use crate::domain::entities::Project;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create(&self, project: &Project) -> AppResult<()>;
    async fn update(&self, project: &Project) -> AppResult<()>;
    async fn delete(&self, id: &ProjectId) -> AppResult<()>;
    async fn find_by_id(&self, id: &ProjectId) -> AppResult<Option<Project>>;
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Project>>;
}
