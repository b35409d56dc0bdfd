//! PostgreSQL unit repository

use async_trait::async_trait;
use obra_common::{AuditInfo, OwnerId, PagedResult, Pagination, ProjectId, TenantId, UnitId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Unit;
use crate::domain::repositories::UnitRepository;

const COLUMNS: &str = "id, project_id, owner_id, identifier, floor, area_m2, delivered_at, \
                       created_at, created_by, updated_at, updated_by";

pub struct PostgresUnitRepository {
    pool: PgPool,
}

impl PostgresUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitRepository for PostgresUnitRepository {
    async fn create(&self, unit: &Unit) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO units (id, project_id, owner_id, identifier, floor, area_m2, delivered_at,
                               created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(unit.id.0)
        .bind(unit.project_id.0)
        .bind(unit.owner_id.map(|o| o.0))
        .bind(&unit.identifier)
        .bind(unit.floor)
        .bind(unit.area_m2)
        .bind(unit.delivered_at)
        .bind(unit.audit_info.created_at)
        .bind(unit.audit_info.created_by.map(|u| u.0))
        .bind(unit.audit_info.updated_at)
        .bind(unit.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create unit: {}", e)))?;

        Ok(())
    }

    async fn update(&self, unit: &Unit) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE units SET
                owner_id = $2, identifier = $3, floor = $4, area_m2 = $5, delivered_at = $6,
                updated_at = $7, updated_by = $8
            WHERE id = $1
            "#,
        )
        .bind(unit.id.0)
        .bind(unit.owner_id.map(|o| o.0))
        .bind(&unit.identifier)
        .bind(unit.floor)
        .bind(unit.area_m2)
        .bind(unit.delivered_at)
        .bind(unit.audit_info.updated_at)
        .bind(unit.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update unit: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &UnitId) -> AppResult<()> {
        sqlx::query("DELETE FROM units WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete unit: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UnitId) -> AppResult<Option<Unit>> {
        let row = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {COLUMNS} FROM units WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find unit: {}", e)))?;

        Ok(row.map(UnitRow::into_unit))
    }

    async fn find_scoped(&self, id: &UnitId) -> AppResult<Option<(Unit, TenantId)>> {
        let row = sqlx::query_as::<_, ScopedUnitRow>(
            r#"
            SELECT u.id, u.project_id, u.owner_id, u.identifier, u.floor, u.area_m2,
                   u.delivered_at, u.created_at, u.created_by, u.updated_at, u.updated_by,
                   p.tenant_id
            FROM units u
            JOIN projects p ON p.id = u.project_id
            WHERE u.id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find unit: {}", e)))?;

        Ok(row.map(|r| {
            let tenant_id = TenantId::from_uuid(r.tenant_id);
            (r.unit.into_unit(), tenant_id)
        }))
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Unit>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM units WHERE project_id = $1")
            .bind(project_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count units: {}", e)))?;

        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {COLUMNS} FROM units WHERE project_id = $1 \
             ORDER BY identifier LIMIT $2 OFFSET $3"
        ))
        .bind(project_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list units: {}", e)))?;

        let units = rows.into_iter().map(UnitRow::into_unit).collect();
        Ok(PagedResult::new(units, total.0 as u64, pagination))
    }

    async fn list_by_owner(&self, owner_id: &OwnerId) -> AppResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, UnitRow>(&format!(
            "SELECT {COLUMNS} FROM units WHERE owner_id = $1 ORDER BY identifier"
        ))
        .bind(owner_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list units by owner: {}", e)))?;

        Ok(rows.into_iter().map(UnitRow::into_unit).collect())
    }
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: Uuid,
    project_id: Uuid,
    owner_id: Option<Uuid>,
    identifier: String,
    floor: Option<i32>,
    area_m2: Option<f64>,
    delivered_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

#[derive(sqlx::FromRow)]
struct ScopedUnitRow {
    #[sqlx(flatten)]
    unit: UnitRow,
    tenant_id: Uuid,
}

impl UnitRow {
    fn into_unit(self) -> Unit {
        Unit {
            id: UnitId::from_uuid(self.id),
            project_id: ProjectId::from_uuid(self.project_id),
            owner_id: self.owner_id.map(OwnerId::from_uuid),
            identifier: self.identifier,
            floor: self.floor,
            area_m2: self.area_m2,
            delivered_at: self.delivered_at,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
