//! PostgreSQL audit log repository

use async_trait::async_trait;
use obra_common::{AuditLogId, PagedResult, Pagination, TenantId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::AuditLog;
use crate::domain::repositories::AuditLogRepository;

const COLUMNS: &str = "id, tenant_id, user_id, action, entity_type, entity_id, detail, created_at";

pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append(&self, entry: &AuditLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, tenant_id, user_id, action, entity_type, entity_id,
                                    detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id.0)
        .bind(entry.tenant_id.map(|t| t.0))
        .bind(entry.user_id.0)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to append audit log: {}", e)))?;

        Ok(())
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<AuditLog>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs WHERE tenant_id = $1")
            .bind(tenant_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count audit logs: {}", e)))?;

        let rows = sqlx::query_as::<_, AuditLogRow>(&format!(
            "SELECT {COLUMNS} FROM audit_logs WHERE tenant_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list audit logs: {}", e)))?;

        let entries = rows.into_iter().map(AuditLogRow::into_entry).collect();
        Ok(PagedResult::new(entries, total.0 as u64, pagination))
    }
}

#[derive(sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    user_id: Uuid,
    action: String,
    entity_type: String,
    entity_id: String,
    detail: Option<serde_json::Value>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AuditLogRow {
    fn into_entry(self) -> AuditLog {
        AuditLog {
            id: AuditLogId::from_uuid(self.id),
            tenant_id: self.tenant_id.map(TenantId::from_uuid),
            user_id: UserId::from_uuid(self.user_id),
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            detail: self.detail,
            created_at: self.created_at,
        }
    }
}
