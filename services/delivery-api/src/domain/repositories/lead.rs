//! Lead repository port

use async_trait::async_trait;
use obra_common::{LeadId, PagedResult, Pagination};
use obra_errors::AppResult;

use crate::domain::entities::Lead;

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn create(&self, lead: &Lead) -> AppResult<()>;
    async fn find_by_id(&self, id: &LeadId) -> AppResult<Option<Lead>>;
    async fn list(&self, pagination: &Pagination) -> AppResult<PagedResult<Lead>>;
    async fn mark_converted(&self, id: &LeadId) -> AppResult<()>;
}
