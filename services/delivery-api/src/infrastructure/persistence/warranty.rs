//! PostgreSQL warranty repositories
//!
//! Regeneration deletes and reinserts a unit's warranty rows inside one
//! transaction so readers never observe a half-replaced set.

use async_trait::async_trait;
use obra_adapter_postgres::TransactionManager;
use obra_common::{AuditInfo, TenantId, UnitId, UnitWarrantyId, UserId, WarrantyCategoryId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{UnitWarranty, WarrantyCategory};
use crate::domain::repositories::{UnitWarrantyRepository, WarrantyCategoryRepository};

const CATEGORY_COLUMNS: &str = "id, tenant_id, name, description, term_years, term_months, \
                                created_at, created_by, updated_at, updated_by";

const WARRANTY_COLUMNS: &str = "id, unit_id, category_id, start_date, expiration_date, \
                                suspended, suspended_reason, \
                                created_at, created_by, updated_at, updated_by";

pub struct PostgresWarrantyCategoryRepository {
    pool: PgPool,
}

impl PostgresWarrantyCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarrantyCategoryRepository for PostgresWarrantyCategoryRepository {
    async fn create(&self, category: &WarrantyCategory) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO warranty_categories (id, tenant_id, name, description, term_years,
                                             term_months, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(category.id.0)
        .bind(category.tenant_id.0)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.term_years)
        .bind(category.term_months)
        .bind(category.audit_info.created_at)
        .bind(category.audit_info.created_by.map(|u| u.0))
        .bind(category.audit_info.updated_at)
        .bind(category.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create warranty category: {}", e)))?;

        Ok(())
    }

    async fn update(&self, category: &WarrantyCategory) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE warranty_categories SET
                name = $2, description = $3, term_years = $4, term_months = $5,
                updated_at = $6, updated_by = $7
            WHERE id = $1
            "#,
        )
        .bind(category.id.0)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.term_years)
        .bind(category.term_months)
        .bind(category.audit_info.updated_at)
        .bind(category.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update warranty category: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &WarrantyCategoryId) -> AppResult<()> {
        sqlx::query("DELETE FROM warranty_categories WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete warranty category: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &WarrantyCategoryId) -> AppResult<Option<WarrantyCategory>> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM warranty_categories WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find warranty category: {}", e)))?;

        Ok(row.map(CategoryRow::into_category))
    }

    async fn find_by_ids(&self, ids: &[WarrantyCategoryId]) -> AppResult<Vec<WarrantyCategory>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM warranty_categories WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find warranty categories: {}", e)))?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn list_by_tenant(&self, tenant_id: &TenantId) -> AppResult<Vec<WarrantyCategory>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM warranty_categories \
             WHERE tenant_id = $1 ORDER BY name"
        ))
        .bind(tenant_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list warranty categories: {}", e)))?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }
}

pub struct PostgresUnitWarrantyRepository {
    pool: PgPool,
    tx: TransactionManager,
}

impl PostgresUnitWarrantyRepository {
    pub fn new(pool: PgPool) -> Self {
        let tx = TransactionManager::new(pool.clone());
        Self { pool, tx }
    }
}

#[async_trait]
impl UnitWarrantyRepository for PostgresUnitWarrantyRepository {
    async fn regenerate(&self, unit_ids: &[UnitId], rows: &[UnitWarranty]) -> AppResult<()> {
        let mut tx = self.tx.begin().await?;

        let uuids: Vec<Uuid> = unit_ids.iter().map(|id| id.0).collect();
        sqlx::query("DELETE FROM unit_warranties WHERE unit_id = ANY($1)")
            .bind(&uuids)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to clear unit warranties: {}", e)))?;

        for warranty in rows {
            sqlx::query(
                r#"
                INSERT INTO unit_warranties (id, unit_id, category_id, start_date, expiration_date,
                                             suspended, suspended_reason,
                                             created_at, created_by, updated_at, updated_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(warranty.id.0)
            .bind(warranty.unit_id.0)
            .bind(warranty.category_id.0)
            .bind(warranty.start_date)
            .bind(warranty.expiration_date)
            .bind(warranty.suspended)
            .bind(&warranty.suspended_reason)
            .bind(warranty.audit_info.created_at)
            .bind(warranty.audit_info.created_by.map(|u| u.0))
            .bind(warranty.audit_info.updated_at)
            .bind(warranty.audit_info.updated_by.map(|u| u.0))
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert unit warranty: {}", e)))?;
        }

        TransactionManager::commit(tx).await
    }

    async fn find_by_id(&self, id: &UnitWarrantyId) -> AppResult<Option<UnitWarranty>> {
        let row = sqlx::query_as::<_, WarrantyRow>(&format!(
            "SELECT {WARRANTY_COLUMNS} FROM unit_warranties WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find unit warranty: {}", e)))?;

        Ok(row.map(WarrantyRow::into_warranty))
    }

    async fn list_by_unit(&self, unit_id: &UnitId) -> AppResult<Vec<UnitWarranty>> {
        let rows = sqlx::query_as::<_, WarrantyRow>(&format!(
            "SELECT {WARRANTY_COLUMNS} FROM unit_warranties \
             WHERE unit_id = $1 ORDER BY expiration_date"
        ))
        .bind(unit_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list unit warranties: {}", e)))?;

        Ok(rows.into_iter().map(WarrantyRow::into_warranty).collect())
    }

    async fn set_suspended(
        &self,
        id: &UnitWarrantyId,
        suspended: bool,
        reason: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE unit_warranties SET suspended = $2, suspended_reason = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id.0)
        .bind(suspended)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update unit warranty: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Warranty not found: {}", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    tenant_id: Uuid,
    name: String,
    description: Option<String>,
    term_years: i32,
    term_months: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl CategoryRow {
    fn into_category(self) -> WarrantyCategory {
        WarrantyCategory {
            id: WarrantyCategoryId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            name: self.name,
            description: self.description,
            term_years: self.term_years,
            term_months: self.term_months,
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
struct WarrantyRow {
    id: Uuid,
    unit_id: Uuid,
    category_id: Uuid,
    start_date: chrono::NaiveDate,
    expiration_date: chrono::NaiveDate,
    suspended: bool,
    suspended_reason: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl WarrantyRow {
    fn into_warranty(self) -> UnitWarranty {
        UnitWarranty {
            id: UnitWarrantyId::from_uuid(self.id),
            unit_id: UnitId::from_uuid(self.unit_id),
            category_id: WarrantyCategoryId::from_uuid(self.category_id),
            start_date: self.start_date,
            expiration_date: self.expiration_date,
            suspended: self.suspended,
            suspended_reason: self.suspended_reason,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
