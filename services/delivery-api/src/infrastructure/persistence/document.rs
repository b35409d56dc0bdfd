//! PostgreSQL document repository
//!
//! `add_version` runs the version insert and the current_version bump in a
//! single transaction, guarded so a stale version number rolls back cleanly.

use async_trait::async_trait;
use obra_adapter_postgres::TransactionManager;
use obra_common::{
    AuditInfo, DocumentId, DocumentVersionId, PagedResult, Pagination, ProjectId, TenantId,
    UnitId, UserId,
};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Document, DocumentVersion};
use crate::domain::repositories::DocumentRepository;

const DOC_COLUMNS: &str = "id, tenant_id, project_id, unit_id, title, category, current_version, \
                           created_at, created_by, updated_at, updated_by";

const VERSION_COLUMNS: &str = "id, document_id, version, object_key, file_name, content_type, \
                               size_bytes, uploaded_by, created_at";

pub struct PostgresDocumentRepository {
    pool: PgPool,
    tx: TransactionManager,
}

impl PostgresDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        let tx = TransactionManager::new(pool.clone());
        Self { pool, tx }
    }
}

#[async_trait]
impl DocumentRepository for PostgresDocumentRepository {
    async fn create(&self, document: &Document) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, tenant_id, project_id, unit_id, title, category,
                                   current_version, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(document.id.0)
        .bind(document.tenant_id.0)
        .bind(document.project_id.0)
        .bind(document.unit_id.map(|u| u.0))
        .bind(&document.title)
        .bind(&document.category)
        .bind(document.current_version)
        .bind(document.audit_info.created_at)
        .bind(document.audit_info.created_by.map(|u| u.0))
        .bind(document.audit_info.updated_at)
        .bind(document.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create document: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &DocumentId) -> AppResult<()> {
        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete document: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &DocumentId) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOC_COLUMNS} FROM documents WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find document: {}", e)))?;

        Ok(row.map(DocumentRow::into_document))
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        unit_id: Option<&UnitId>,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Document>> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM documents \
             WHERE project_id = $1 AND ($2::uuid IS NULL OR unit_id = $2)",
        )
        .bind(project_id.0)
        .bind(unit_id.map(|u| u.0))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count documents: {}", e)))?;

        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "SELECT {DOC_COLUMNS} FROM documents \
             WHERE project_id = $1 AND ($2::uuid IS NULL OR unit_id = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(project_id.0)
        .bind(unit_id.map(|u| u.0))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list documents: {}", e)))?;

        let documents = rows.into_iter().map(DocumentRow::into_document).collect();
        Ok(PagedResult::new(documents, total.0 as u64, pagination))
    }

    async fn add_version(&self, version: &DocumentVersion) -> AppResult<()> {
        let mut tx = self.tx.begin().await?;

        let bumped = sqlx::query(
            "UPDATE documents SET current_version = $2, updated_at = now() \
             WHERE id = $1 AND current_version = $2 - 1",
        )
        .bind(version.document_id.0)
        .bind(version.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to bump document version: {}", e)))?;

        if bumped.rows_affected() == 0 {
            TransactionManager::rollback(tx).await?;
            return Err(AppError::conflict(format!(
                "Stale version {} for document {}",
                version.version, version.document_id
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO document_versions (id, document_id, version, object_key, file_name,
                                           content_type, size_bytes, uploaded_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(version.id.0)
        .bind(version.document_id.0)
        .bind(version.version)
        .bind(&version.object_key)
        .bind(&version.file_name)
        .bind(&version.content_type)
        .bind(version.size_bytes)
        .bind(version.uploaded_by.0)
        .bind(version.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert document version: {}", e)))?;

        TransactionManager::commit(tx).await
    }

    async fn list_versions(&self, document_id: &DocumentId) -> AppResult<Vec<DocumentVersion>> {
        let rows = sqlx::query_as::<_, VersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM document_versions \
             WHERE document_id = $1 ORDER BY version DESC"
        ))
        .bind(document_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list document versions: {}", e)))?;

        Ok(rows.into_iter().map(VersionRow::into_version).collect())
    }

    async fn find_version(
        &self,
        document_id: &DocumentId,
        version: i32,
    ) -> AppResult<Option<DocumentVersion>> {
        let row = sqlx::query_as::<_, VersionRow>(&format!(
            "SELECT {VERSION_COLUMNS} FROM document_versions \
             WHERE document_id = $1 AND version = $2"
        ))
        .bind(document_id.0)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find document version: {}", e)))?;

        Ok(row.map(VersionRow::into_version))
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    tenant_id: Uuid,
    project_id: Uuid,
    unit_id: Option<Uuid>,
    title: String,
    category: String,
    current_version: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl DocumentRow {
    fn into_document(self) -> Document {
        Document {
            id: DocumentId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            project_id: ProjectId::from_uuid(self.project_id),
            unit_id: self.unit_id.map(UnitId::from_uuid),
            title: self.title,
            category: self.category,
            current_version: self.current_version,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct VersionRow {
    id: Uuid,
    document_id: Uuid,
    version: i32,
    object_key: String,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    uploaded_by: Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl VersionRow {
    fn into_version(self) -> DocumentVersion {
        DocumentVersion {
            id: DocumentVersionId::from_uuid(self.id),
            document_id: DocumentId::from_uuid(self.document_id),
            version: self.version,
            object_key: self.object_key,
            file_name: self.file_name,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            uploaded_by: UserId::from_uuid(self.uploaded_by),
            created_at: self.created_at,
        }
    }
}
