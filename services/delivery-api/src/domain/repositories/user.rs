//! User and password-reset repository ports

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use obra_common::{PagedResult, Pagination, TenantId, UserId};
use obra_errors::AppResult;

use crate::domain::entities::User;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> AppResult<()>;
    async fn update(&self, user: &User) -> AppResult<()>;
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<User>>;
}

/// A stored password-reset token. Only the sha256 of the raw token is kept.
#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create(&self, token: &PasswordResetToken) -> AppResult<()>;

    /// Unused, unexpired token matching the hash
    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<PasswordResetToken>>;

    async fn mark_used(&self, id: &uuid::Uuid) -> AppResult<()>;
}
