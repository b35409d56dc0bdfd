//! Document upload, versioning and signed download URLs

use async_trait::async_trait;
use obra_auth_core::Role;
use obra_common::{AuditInfo, DocumentId, PagedResult, Pagination, ProjectId, UnitId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use obra_ports::ObjectStorage;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{object_key, AuditLog, Document, DocumentVersion};
use crate::domain::repositories::{
    AuditLogRepository, DocumentRepository, OwnerRepository, ProjectRepository, UnitRepository,
};

use super::context::{record_audit, Actor};

pub struct UploadDocumentCommand {
    pub actor: Actor,
    pub project_id: ProjectId,
    pub unit_id: Option<UnitId>,
    pub title: String,
    pub category: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Command for UploadDocumentCommand {
    type Result = Document;
}

/// Append a new version to an existing document
pub struct AddVersionCommand {
    pub actor: Actor,
    pub document_id: DocumentId,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Command for AddVersionCommand {
    type Result = DocumentVersion;
}

pub struct DeleteDocumentCommand {
    pub actor: Actor,
    pub document_id: DocumentId,
}

impl Command for DeleteDocumentCommand {
    type Result = ();
}

pub struct GetDocumentQuery {
    pub actor: Actor,
    pub document_id: DocumentId,
}

impl Query for GetDocumentQuery {
    type Result = Document;
}

pub struct ListDocumentsQuery {
    pub actor: Actor,
    pub project_id: ProjectId,
    pub unit_id: Option<UnitId>,
    pub pagination: Pagination,
}

impl Query for ListDocumentsQuery {
    type Result = PagedResult<Document>;
}

pub struct ListVersionsQuery {
    pub actor: Actor,
    pub document_id: DocumentId,
}

impl Query for ListVersionsQuery {
    type Result = Vec<DocumentVersion>;
}

/// Presigned GET URL for a document version (current version by default)
pub struct GetDownloadUrlQuery {
    pub actor: Actor,
    pub document_id: DocumentId,
    pub version: Option<i32>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DownloadUrl {
    pub url: String,
    pub expires_in_secs: u64,
    pub file_name: String,
    pub content_type: String,
}

impl Query for GetDownloadUrlQuery {
    type Result = DownloadUrl;
}

pub struct DocumentHandler {
    documents: Arc<dyn DocumentRepository>,
    projects: Arc<dyn ProjectRepository>,
    units: Arc<dyn UnitRepository>,
    owners: Arc<dyn OwnerRepository>,
    storage: Arc<dyn ObjectStorage>,
    audit: Arc<dyn AuditLogRepository>,
    presign_expiry: Duration,
}

impl DocumentHandler {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        projects: Arc<dyn ProjectRepository>,
        units: Arc<dyn UnitRepository>,
        owners: Arc<dyn OwnerRepository>,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<dyn AuditLogRepository>,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            documents,
            projects,
            units,
            owners,
            storage,
            audit,
            presign_expiry,
        }
    }

    /// Load a document and enforce tenant scope. OWNER actors additionally
    /// need the document to be project-level or attached to one of their units.
    async fn load_readable(&self, actor: &Actor, document_id: &DocumentId) -> AppResult<Document> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document not found: {}", document_id)))?;

        actor.ensure_tenant_scope(&document.tenant_id)?;

        if actor.role == Role::Owner {
            let owner = self
                .owners
                .find_by_user(&actor.user_id)
                .await?
                .ok_or_else(|| AppError::forbidden("No owner record linked to this account"))?;

            match document.unit_id {
                None => {
                    // project-level document: readable by owners with a unit in it
                    let my_units = self.units.list_by_owner(&owner.id).await?;
                    if !my_units.iter().any(|u| u.project_id == document.project_id) {
                        return Err(AppError::forbidden("Document belongs to another project"));
                    }
                }
                Some(unit_id) => {
                    let unit = self
                        .units
                        .find_by_id(&unit_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("Unit not found: {}", unit_id)))?;
                    if unit.owner_id != Some(owner.id) {
                        return Err(AppError::forbidden("Document belongs to another owner"));
                    }
                }
            }
        }

        Ok(document)
    }

    async fn load_writable(&self, actor: &Actor, document_id: &DocumentId) -> AppResult<Document> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document not found: {}", document_id)))?;

        actor.ensure_admin_scope(&document.tenant_id)?;
        Ok(document)
    }

    /// Upload the object, then commit the version row and the current_version
    /// bump together. The orphan object left by a failed insert is deleted on
    /// a best-effort basis.
    async fn store_version(
        &self,
        document: &Document,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
        actor: &Actor,
    ) -> AppResult<DocumentVersion> {
        if bytes.is_empty() {
            return Err(AppError::validation("Document body is empty"));
        }

        let next = document.next_version();
        let key = object_key(&document.tenant_id, &document.id, next, &file_name);
        let size_bytes = bytes.len() as i64;

        self.storage.put_object(&key, &content_type, bytes).await?;

        let version = DocumentVersion::new(
            document.id,
            next,
            key.clone(),
            file_name,
            content_type,
            size_bytes,
            actor.user_id,
        );

        if let Err(e) = self.documents.add_version(&version).await {
            if let Err(cleanup) = self.storage.delete_object(&key).await {
                tracing::warn!(key = %key, error = %cleanup, "Failed to remove orphan object");
            }
            return Err(e);
        }

        tracing::info!(
            document_id = %document.id,
            version = next,
            key = %key,
            "Document version stored"
        );

        Ok(version)
    }
}

#[async_trait]
impl CommandHandler<UploadDocumentCommand> for DocumentHandler {
    async fn handle(&self, command: UploadDocumentCommand) -> AppResult<Document> {
        let project = self
            .projects
            .find_by_id(&command.project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project not found: {}", command.project_id)))?;

        command.actor.ensure_admin_scope(&project.tenant_id)?;

        if let Some(unit_id) = &command.unit_id {
            let (unit, _) = self
                .units
                .find_scoped(unit_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Unit not found: {}", unit_id)))?;
            if unit.project_id != project.id {
                return Err(AppError::validation("Unit does not belong to the project"));
            }
        }

        if command.title.trim().is_empty() {
            return Err(AppError::validation("Document title is required"));
        }

        let mut document = Document::new(
            project.tenant_id,
            project.id,
            command.unit_id,
            command.title,
            command.category,
        );
        document.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.documents.create(&document).await?;

        let version = self
            .store_version(
                &document,
                command.file_name,
                command.content_type,
                command.bytes,
                &command.actor,
            )
            .await?;
        document.current_version = version.version;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(document.tenant_id),
                command.actor.user_id,
                "document.upload",
                "document",
                document.id.to_string(),
            ),
        )
        .await;

        Ok(document)
    }
}

#[async_trait]
impl CommandHandler<AddVersionCommand> for DocumentHandler {
    async fn handle(&self, command: AddVersionCommand) -> AppResult<DocumentVersion> {
        let document = self.load_writable(&command.actor, &command.document_id).await?;

        let version = self
            .store_version(
                &document,
                command.file_name,
                command.content_type,
                command.bytes,
                &command.actor,
            )
            .await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(document.tenant_id),
                command.actor.user_id,
                "document.add_version",
                "document",
                document.id.to_string(),
            ),
        )
        .await;

        Ok(version)
    }
}

#[async_trait]
impl CommandHandler<DeleteDocumentCommand> for DocumentHandler {
    async fn handle(&self, command: DeleteDocumentCommand) -> AppResult<()> {
        let document = self.load_writable(&command.actor, &command.document_id).await?;

        // remove stored objects first; a leftover row is worse than a leftover blob
        let versions = self.documents.list_versions(&document.id).await?;
        for version in &versions {
            if let Err(e) = self.storage.delete_object(&version.object_key).await {
                tracing::warn!(key = %version.object_key, error = %e, "Failed to delete object");
            }
        }

        self.documents.delete(&document.id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(document.tenant_id),
                command.actor.user_id,
                "document.delete",
                "document",
                document.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetDocumentQuery> for DocumentHandler {
    async fn execute(&self, query: GetDocumentQuery) -> AppResult<Document> {
        self.load_readable(&query.actor, &query.document_id).await
    }
}

#[async_trait]
impl QueryHandler<ListDocumentsQuery> for DocumentHandler {
    async fn execute(&self, query: ListDocumentsQuery) -> AppResult<PagedResult<Document>> {
        let project = self
            .projects
            .find_by_id(&query.project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project not found: {}", query.project_id)))?;

        query.actor.ensure_tenant_scope(&project.tenant_id)?;

        self.documents
            .list_by_project(&project.id, query.unit_id.as_ref(), &query.pagination)
            .await
    }
}

#[async_trait]
impl QueryHandler<ListVersionsQuery> for DocumentHandler {
    async fn execute(&self, query: ListVersionsQuery) -> AppResult<Vec<DocumentVersion>> {
        let document = self.load_readable(&query.actor, &query.document_id).await?;

        self.documents.list_versions(&document.id).await
    }
}

#[async_trait]
impl QueryHandler<GetDownloadUrlQuery> for DocumentHandler {
    async fn execute(&self, query: GetDownloadUrlQuery) -> AppResult<DownloadUrl> {
        let document = self.load_readable(&query.actor, &query.document_id).await?;

        let wanted = query.version.unwrap_or(document.current_version);
        let version = self
            .documents
            .find_version(&document.id, wanted)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {} not found for document {}",
                    wanted, document.id
                ))
            })?;

        let url = self
            .storage
            .presign_get(&version.object_key, self.presign_expiry)?;

        Ok(DownloadUrl {
            url,
            expires_in_secs: self.presign_expiry.as_secs(),
            file_name: version.file_name,
            content_type: version.content_type,
        })
    }
}
