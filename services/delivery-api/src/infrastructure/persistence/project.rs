//! PostgreSQL project repository

use async_trait::async_trait;
use obra_common::{AuditInfo, PagedResult, Pagination, ProjectId, TenantId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Project, ProjectStatus};
use crate::domain::repositories::ProjectRepository;

const COLUMNS: &str = "id, tenant_id, name, address, city, state, delivery_date, description, \
                       status, created_at, created_by, updated_at, updated_by";

pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create(&self, project: &Project) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, tenant_id, name, address, city, state, delivery_date,
                                  description, status, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(project.id.0)
        .bind(project.tenant_id.0)
        .bind(&project.name)
        .bind(&project.address)
        .bind(&project.city)
        .bind(&project.state)
        .bind(project.delivery_date)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.audit_info.created_at)
        .bind(project.audit_info.created_by.map(|u| u.0))
        .bind(project.audit_info.updated_at)
        .bind(project.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create project: {}", e)))?;

        Ok(())
    }

    async fn update(&self, project: &Project) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE projects SET
                name = $2, address = $3, city = $4, state = $5, delivery_date = $6,
                description = $7, status = $8, updated_at = $9, updated_by = $10
            WHERE id = $1
            "#,
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.address)
        .bind(&project.city)
        .bind(&project.state)
        .bind(project.delivery_date)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(project.audit_info.updated_at)
        .bind(project.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update project: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &ProjectId) -> AppResult<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete project: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find project: {}", e)))?;

        Ok(row.map(ProjectRow::into_project))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Project>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE tenant_id = $1")
            .bind(tenant_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count projects: {}", e)))?;

        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {COLUMNS} FROM projects WHERE tenant_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list projects: {}", e)))?;

        let projects = rows.into_iter().map(ProjectRow::into_project).collect();
        Ok(PagedResult::new(projects, total.0 as u64, pagination))
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    delivery_date: Option<chrono::NaiveDate>,
    description: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl ProjectRow {
    fn into_project(self) -> Project {
        Project {
            id: ProjectId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            delivery_date: self.delivery_date,
            description: self.description,
            status: ProjectStatus::parse(&self.status).unwrap_or(ProjectStatus::Planejamento),
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
