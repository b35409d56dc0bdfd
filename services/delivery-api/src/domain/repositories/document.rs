//! Document repository port
//!
//! `add_version` is atomic: the version row insert and the
//! `documents.current_version` bump commit together or not at all.

use async_trait::async_trait;
use obra_common::{DocumentId, PagedResult, Pagination, ProjectId, UnitId};
use obra_errors::AppResult;

use crate::domain::entities::{Document, DocumentVersion};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> AppResult<()>;
    async fn delete(&self, id: &DocumentId) -> AppResult<()>;
    async fn find_by_id(&self, id: &DocumentId) -> AppResult<Option<Document>>;

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        unit_id: Option<&UnitId>,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Document>>;

    /// Insert the version row and bump the document's current_version in one
    /// transaction. Fails with Conflict if the version number is stale.
    async fn add_version(&self, version: &DocumentVersion) -> AppResult<()>;

    async fn list_versions(&self, document_id: &DocumentId) -> AppResult<Vec<DocumentVersion>>;

    async fn find_version(
        &self,
        document_id: &DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>>;
}
