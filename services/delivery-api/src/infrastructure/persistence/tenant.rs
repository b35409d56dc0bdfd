//! PostgreSQL tenant repository

use async_trait::async_trait;
use obra_common::{AuditInfo, PagedResult, Pagination, TenantId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Tenant;
use crate::domain::repositories::TenantRepository;

const COLUMNS: &str = "id, name, slug, cnpj, contact_email, contact_phone, logo_url, active, \
                       created_at, created_by, updated_at, updated_by";

pub struct PostgresTenantRepository {
    pool: PgPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn create(&self, tenant: &Tenant) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, slug, cnpj, contact_email, contact_phone, logo_url,
                                 active, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(tenant.id.0)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.cnpj)
        .bind(&tenant.contact_email)
        .bind(&tenant.contact_phone)
        .bind(&tenant.logo_url)
        .bind(tenant.active)
        .bind(tenant.audit_info.created_at)
        .bind(tenant.audit_info.created_by.map(|u| u.0))
        .bind(tenant.audit_info.updated_at)
        .bind(tenant.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Tenant slug already in use: {}", tenant.slug))
            } else {
                AppError::database(format!("Failed to create tenant: {}", e))
            }
        })?;

        Ok(())
    }

    async fn update(&self, tenant: &Tenant) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE tenants SET
                name = $2, slug = $3, cnpj = $4, contact_email = $5, contact_phone = $6,
                logo_url = $7, active = $8, updated_at = $9, updated_by = $10
            WHERE id = $1
            "#,
        )
        .bind(tenant.id.0)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(&tenant.cnpj)
        .bind(&tenant.contact_email)
        .bind(&tenant.contact_phone)
        .bind(&tenant.logo_url)
        .bind(tenant.active)
        .bind(tenant.audit_info.updated_at)
        .bind(tenant.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update tenant: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TenantId) -> AppResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find tenant: {}", e)))?;

        Ok(row.map(TenantRow::into_tenant))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {COLUMNS} FROM tenants WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find tenant by slug: {}", e)))?;

        Ok(row.map(TenantRow::into_tenant))
    }

    async fn list(&self, pagination: &Pagination) -> AppResult<PagedResult<Tenant>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count tenants: {}", e)))?;

        let rows = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {COLUMNS} FROM tenants ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list tenants: {}", e)))?;

        let tenants = rows.into_iter().map(TenantRow::into_tenant).collect();
        Ok(PagedResult::new(tenants, total.0 as u64, pagination))
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    slug: String,
    cnpj: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    logo_url: Option<String>,
    active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl TenantRow {
    fn into_tenant(self) -> Tenant {
        Tenant {
            id: TenantId::from_uuid(self.id),
            name: self.name,
            slug: self.slug,
            cnpj: self.cnpj,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            logo_url: self.logo_url,
            active: self.active,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        }
    }
}
