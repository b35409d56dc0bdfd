//! PostgreSQL owner repository

use async_trait::async_trait;
use obra_common::{AuditInfo, OwnerId, PagedResult, Pagination, TenantId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Owner;
use crate::domain::repositories::OwnerRepository;
use crate::domain::value_objects::Email;

const COLUMNS: &str = "id, tenant_id, user_id, name, email, phone, cpf, \
                       created_at, created_by, updated_at, updated_by";

pub struct PostgresOwnerRepository {
    pool: PgPool,
}

impl PostgresOwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerRepository for PostgresOwnerRepository {
    async fn create(&self, owner: &Owner) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO owners (id, tenant_id, user_id, name, email, phone, cpf,
                                created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(owner.id.0)
        .bind(owner.tenant_id.0)
        .bind(owner.user_id.map(|u| u.0))
        .bind(&owner.name)
        .bind(owner.email.as_str())
        .bind(&owner.phone)
        .bind(&owner.cpf)
        .bind(owner.audit_info.created_at)
        .bind(owner.audit_info.created_by.map(|u| u.0))
        .bind(owner.audit_info.updated_at)
        .bind(owner.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create owner: {}", e)))?;

        Ok(())
    }

    async fn update(&self, owner: &Owner) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE owners SET
                user_id = $2, name = $3, email = $4, phone = $5, cpf = $6,
                updated_at = $7, updated_by = $8
            WHERE id = $1
            "#,
        )
        .bind(owner.id.0)
        .bind(owner.user_id.map(|u| u.0))
        .bind(&owner.name)
        .bind(owner.email.as_str())
        .bind(&owner.phone)
        .bind(&owner.cpf)
        .bind(owner.audit_info.updated_at)
        .bind(owner.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update owner: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, id: &OwnerId) -> AppResult<()> {
        sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete owner: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &OwnerId) -> AppResult<Option<Owner>> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {COLUMNS} FROM owners WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find owner: {}", e)))?;

        row.map(OwnerRow::into_owner).transpose()
    }

    async fn find_by_user(&self, user_id: &UserId) -> AppResult<Option<Owner>> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {COLUMNS} FROM owners WHERE user_id = $1"
        ))
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find owner by user: {}", e)))?;

        row.map(OwnerRow::into_owner).transpose()
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<Owner>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM owners WHERE tenant_id = $1")
            .bind(tenant_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count owners: {}", e)))?;

        let rows = sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {COLUMNS} FROM owners WHERE tenant_id = $1 \
             ORDER BY name LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list owners: {}", e)))?;

        let owners: AppResult<Vec<_>> = rows.into_iter().map(OwnerRow::into_owner).collect();
        Ok(PagedResult::new(owners?, total.0 as u64, pagination))
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: Uuid,
    tenant_id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    cpf: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    created_by: Option<Uuid>,
    updated_at: chrono::DateTime<chrono::Utc>,
    updated_by: Option<Uuid>,
}

impl OwnerRow {
    fn into_owner(self) -> AppResult<Owner> {
        let email = Email::new(&self.email).map_err(|e| {
            AppError::database(format!("Invalid email in database for owner {}: {}", self.id, e))
        })?;

        Ok(Owner {
            id: OwnerId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            user_id: self.user_id.map(UserId::from_uuid),
            name: self.name,
            email,
            phone: self.phone,
            cpf: self.cpf,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        })
    }
}
