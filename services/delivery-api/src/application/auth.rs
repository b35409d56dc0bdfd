//! Authentication: login, token refresh, password reset, user provisioning

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use obra_auth_core::{Role, TokenService};
use obra_common::{AuditInfo, TenantId, UserId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use obra_adapter_email::EmailSender;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, User};
use crate::domain::repositories::{
    AuditLogRepository, PasswordResetRepository, PasswordResetToken, UserRepository,
};
use crate::domain::services::password;
use crate::domain::value_objects::{Email, Password};
use crate::error::AuthError;

use super::context::{record_audit, Actor};

/// Raw reset token: 32 random bytes, hex-encoded
pub(crate) fn new_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Only the sha256 of a reset token is stored
pub(crate) fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub(crate) fn reset_token_entity(
    user_id: UserId,
    token_hash: String,
    expires_at: DateTime<Utc>,
) -> PasswordResetToken {
    PasswordResetToken {
        id: uuid::Uuid::now_v7(),
        user_id,
        token_hash,
        expires_at,
        used_at: None,
        created_at: Utc::now(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl Command for LoginCommand {
    type Result = TokenPair;
}

pub struct RefreshTokenCommand {
    pub refresh_token: String,
}

impl Command for RefreshTokenCommand {
    type Result = TokenPair;
}

pub struct MeQuery {
    pub actor: Actor,
}

impl Query for MeQuery {
    type Result = User;
}

/// Always resolves Ok so callers cannot probe which emails exist
pub struct RequestPasswordResetCommand {
    pub email: String,
}

impl Command for RequestPasswordResetCommand {
    type Result = ();
}

pub struct ConfirmPasswordResetCommand {
    pub token: String,
    pub new_password: String,
}

impl Command for ConfirmPasswordResetCommand {
    type Result = ();
}

/// MASTER provisions ADMIN users for a tenant; ADMIN provisions OWNER users
/// in their own tenant.
pub struct CreateUserCommand {
    pub actor: Actor,
    pub tenant_id: Option<TenantId>,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

impl Command for CreateUserCommand {
    type Result = User;
}

pub struct AuthHandler {
    users: Arc<dyn UserRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    email: Arc<dyn EmailSender>,
    tokens: Arc<TokenService>,
    audit: Arc<dyn AuditLogRepository>,
    reset_link_base_url: String,
    reset_expires_minutes: i64,
}

impl AuthHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        email: Arc<dyn EmailSender>,
        tokens: Arc<TokenService>,
        audit: Arc<dyn AuditLogRepository>,
        reset_link_base_url: String,
        reset_expires_minutes: i64,
    ) -> Self {
        Self {
            users,
            resets,
            email,
            tokens,
            audit,
            reset_link_base_url,
            reset_expires_minutes,
        }
    }

    fn token_pair(&self, user: &User) -> AppResult<TokenPair> {
        let access_token =
            self.tokens
                .generate_access_token(&user.id, user.tenant_id.as_ref(), user.role)?;
        let refresh_token =
            self.tokens
                .generate_refresh_token(&user.id, user.tenant_id.as_ref(), user.role)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.tokens.access_token_expires_in(),
        })
    }
}

#[async_trait]
impl CommandHandler<LoginCommand> for AuthHandler {
    async fn handle(&self, command: LoginCommand) -> AppResult<TokenPair> {
        let mut user = self
            .users
            .find_by_email(&command.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(&command.password, &user.password_hash) {
            tracing::info!(email = %command.email, "Login failed: bad password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active() {
            return Err(AuthError::UserInactive.into());
        }

        user.record_login();
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Login succeeded");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                user.tenant_id,
                user.id,
                "auth.login",
                "user",
                user.id.to_string(),
            ),
        )
        .await;

        self.token_pair(&user)
    }
}

#[async_trait]
impl CommandHandler<RefreshTokenCommand> for AuthHandler {
    async fn handle(&self, command: RefreshTokenCommand) -> AppResult<TokenPair> {
        let claims = self.tokens.validate_refresh_token(&command.refresh_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active() {
            return Err(AuthError::UserInactive.into());
        }

        self.token_pair(&user)
    }
}

#[async_trait]
impl QueryHandler<MeQuery> for AuthHandler {
    async fn execute(&self, query: MeQuery) -> AppResult<User> {
        self.users
            .find_by_id(&query.actor.user_id)
            .await?
            .ok_or_else(|| AuthError::UserNotFound.into())
    }
}

#[async_trait]
impl CommandHandler<RequestPasswordResetCommand> for AuthHandler {
    /// Resolves Ok for known and unknown emails alike; a failure while
    /// persisting the token or dispatching the mail must not change the
    /// response either, or it would reveal which addresses are registered.
    async fn handle(&self, command: RequestPasswordResetCommand) -> AppResult<()> {
        match self.users.find_by_email(&command.email).await {
            Ok(Some(user)) if user.is_active() => {
                if let Err(e) = self.send_reset_mail(&user).await {
                    tracing::error!(user_id = %user.id, error = %e, "Password reset dispatch failed");
                }
            }
            Ok(_) => {
                tracing::info!("Password reset requested for unknown or inactive email");
            }
            Err(e) => {
                tracing::error!(error = %e, "Password reset lookup failed");
            }
        }

        Ok(())
    }
}

impl AuthHandler {
    async fn send_reset_mail(&self, user: &User) -> AppResult<()> {
        let raw_token = new_reset_token();
        let token = reset_token_entity(
            user.id,
            hash_reset_token(&raw_token),
            Utc::now() + Duration::minutes(self.reset_expires_minutes),
        );
        self.resets.create(&token).await?;

        let reset_link = format!("{}?token={}", self.reset_link_base_url, raw_token);
        let context = serde_json::json!({
            "user_name": user.display_name,
            "reset_link": reset_link,
            "expires_in_minutes": self.reset_expires_minutes,
        });

        self.email
            .send_template_email(
                user.email.as_str(),
                "Redefinição de senha",
                "password_reset.html",
                &context,
            )
            .await?;

        tracing::info!(user_id = %user.id, "Password reset mail sent");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<ConfirmPasswordResetCommand> for AuthHandler {
    async fn handle(&self, command: ConfirmPasswordResetCommand) -> AppResult<()> {
        let new_password = Password::new(&command.new_password)?;

        let token = self
            .resets
            .find_valid(&hash_reset_token(&command.token), Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let mut user = self
            .users
            .find_by_id(&token.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.update_password(password::hash_password(&new_password)?);
        user.audit_info.update(Some(user.id));
        self.users.update(&user).await?;
        self.resets.mark_used(&token.id).await?;

        tracing::info!(user_id = %user.id, "Password reset confirmed");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                user.tenant_id,
                user.id,
                "auth.password_reset",
                "user",
                user.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateUserCommand> for AuthHandler {
    async fn handle(&self, command: CreateUserCommand) -> AppResult<User> {
        let tenant_id = match (command.actor.role, command.role) {
            (Role::Master, Role::Admin) => Some(
                command
                    .tenant_id
                    .ok_or_else(|| AppError::validation("tenant_id is required for ADMIN users"))?,
            ),
            (Role::Admin, Role::Owner) => Some(command.actor.require_tenant()?),
            _ => {
                return Err(AppError::forbidden(format!(
                    "Role {} cannot create {} users",
                    command.actor.role, command.role
                )))
            }
        };

        let email = Email::new(&command.email)?;
        let pwd = Password::new(&command.password)?;

        if self.users.find_by_email(email.as_str()).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let mut user = User::new(
            tenant_id,
            email,
            password::hash_password(&pwd)?,
            command.display_name,
            command.role,
        );
        user.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                tenant_id,
                command.actor.user_id,
                "user.create",
                "user",
                user.id.to_string(),
            ),
        )
        .await;

        Ok(user)
    }
}
