//! PostgreSQL user and password-reset repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obra_auth_core::Role;
use obra_common::{AuditInfo, PagedResult, Pagination, TenantId, UserId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entities::{User, UserStatus};
use crate::domain::repositories::{PasswordResetRepository, PasswordResetToken, UserRepository};
use crate::domain::value_objects::{Email, HashedPassword};

use super::tenant::is_unique_violation;

const COLUMNS: &str = "id, tenant_id, email, password_hash, display_name, role, status, \
                       last_login_at, created_at, created_by, updated_at, updated_by";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, tenant_id, email, password_hash, display_name, role, status,
                               last_login_at, created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.0)
        .bind(user.tenant_id.map(|t| t.0))
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(status_to_str(user.status))
        .bind(user.last_login_at)
        .bind(user.audit_info.created_at)
        .bind(user.audit_info.created_by.map(|u| u.0))
        .bind(user.audit_info.updated_at)
        .bind(user.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Email already registered: {}", user.email))
            } else {
                AppError::database(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2, password_hash = $3, display_name = $4, role = $5, status = $6,
                last_login_at = $7, updated_at = $8, updated_by = $9
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(status_to_str(user.status))
        .bind(user.last_login_at)
        .bind(user.audit_info.updated_at)
        .bind(user.audit_info.updated_by.map(|u| u.0))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update user: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find user by email: {}", e)))?;

        row.map(UserRow::into_user).transpose()
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<User>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE tenant_id = $1")
            .bind(tenant_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {}", e)))?;

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {COLUMNS} FROM users WHERE tenant_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {}", e)))?;

        let users: AppResult<Vec<_>> = rows.into_iter().map(UserRow::into_user).collect();
        Ok(PagedResult::new(users?, total.0 as u64, pagination))
    }
}

fn status_to_str(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "ACTIVE",
        UserStatus::Inactive => "INACTIVE",
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Option<Uuid>,
    email: String,
    password_hash: String,
    display_name: String,
    role: String,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    created_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
    updated_by: Option<Uuid>,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let email = Email::new(&self.email).map_err(|e| {
            AppError::database(format!("Invalid email in database for user {}: {}", self.id, e))
        })?;

        let role = Role::from_str(&self.role).map_err(|e| {
            AppError::database(format!("Invalid role in database for user {}: {}", self.id, e))
        })?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            tenant_id: self.tenant_id.map(TenantId::from_uuid),
            email,
            password_hash: HashedPassword::from_hash(self.password_hash),
            display_name: self.display_name,
            role,
            status: match self.status.as_str() {
                "ACTIVE" => UserStatus::Active,
                _ => UserStatus::Inactive,
            },
            last_login_at: self.last_login_at,
            audit_info: AuditInfo {
                created_at: self.created_at,
                created_by: self.created_by.map(UserId::from_uuid),
                updated_at: self.updated_at,
                updated_by: self.updated_by.map(UserId::from_uuid),
            },
        })
    }
}

pub struct PostgresPasswordResetRepository {
    pool: PgPool,
}

impl PostgresPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasswordResetRepository for PostgresPasswordResetRepository {
    async fn create(&self, token: &PasswordResetToken) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id)
        .bind(token.user_id.0)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create password reset: {}", e)))?;

        Ok(())
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, ResetRow>(
            "SELECT id, user_id, token_hash, expires_at, used_at, created_at \
             FROM password_resets \
             WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find password reset: {}", e)))?;

        Ok(row.map(ResetRow::into_token))
    }

    async fn mark_used(&self, id: &Uuid) -> AppResult<()> {
        sqlx::query("UPDATE password_resets SET used_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark password reset used: {}", e)))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ResetRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ResetRow {
    fn into_token(self) -> PasswordResetToken {
        PasswordResetToken {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        }
    }
}
