//! Owner management
//!
//! Creating an owner can also provision an OWNER login; the invitation mail
//! carries a password-reset link so the platform never emails a password.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use obra_common::{AuditInfo, OwnerId, PagedResult, Pagination, TenantId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use obra_adapter_email::EmailSender;
use std::sync::Arc;

use crate::domain::entities::{AuditLog, Owner, User};
use crate::domain::repositories::{
    AuditLogRepository, OwnerRepository, PasswordResetRepository, UserRepository,
};
use crate::domain::services::password;
use crate::domain::value_objects::{Email, Password};

use super::auth::{hash_reset_token, new_reset_token, reset_token_entity};
use super::context::{record_audit, Actor};
use obra_auth_core::Role;

pub struct CreateOwnerCommand {
    pub actor: Actor,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    /// Also create an OWNER login and send an invitation mail
    pub create_login: bool,
}

impl Command for CreateOwnerCommand {
    type Result = Owner;
}

pub struct UpdateOwnerCommand {
    pub actor: Actor,
    pub owner_id: OwnerId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub cpf: Option<String>,
}

impl Command for UpdateOwnerCommand {
    type Result = Owner;
}

pub struct DeleteOwnerCommand {
    pub actor: Actor,
    pub owner_id: OwnerId,
}

impl Command for DeleteOwnerCommand {
    type Result = ();
}

pub struct GetOwnerQuery {
    pub actor: Actor,
    pub owner_id: OwnerId,
}

impl Query for GetOwnerQuery {
    type Result = Owner;
}

pub struct ListOwnersQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub pagination: Pagination,
}

impl Query for ListOwnersQuery {
    type Result = PagedResult<Owner>;
}

pub struct OwnerHandler {
    owners: Arc<dyn OwnerRepository>,
    users: Arc<dyn UserRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    email: Arc<dyn EmailSender>,
    audit: Arc<dyn AuditLogRepository>,
    reset_link_base_url: String,
    reset_expires_minutes: i64,
}

impl OwnerHandler {
    pub fn new(
        owners: Arc<dyn OwnerRepository>,
        users: Arc<dyn UserRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        email: Arc<dyn EmailSender>,
        audit: Arc<dyn AuditLogRepository>,
        reset_link_base_url: String,
        reset_expires_minutes: i64,
    ) -> Self {
        Self {
            owners,
            users,
            resets,
            email,
            audit,
            reset_link_base_url,
            reset_expires_minutes,
        }
    }

    async fn load_scoped(&self, actor: &Actor, owner_id: &OwnerId) -> AppResult<Owner> {
        let owner = self
            .owners
            .find_by_id(owner_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Owner not found: {}", owner_id)))?;

        actor.ensure_tenant_scope(&owner.tenant_id)?;
        Ok(owner)
    }

    /// Create an OWNER user with an unguessable password and email an
    /// invitation carrying a first-access reset link.
    async fn provision_login(&self, owner: &mut Owner) -> AppResult<()> {
        if self.users.find_by_email(owner.email.as_str()).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Email already registered: {}",
                owner.email
            )));
        }

        let random = new_reset_token();
        let initial = Password::new(format!("A1{}", &random[..24]))?;
        let user = User::new(
            Some(owner.tenant_id),
            owner.email.clone(),
            password::hash_password(&initial)?,
            owner.name.clone(),
            Role::Owner,
        );
        self.users.create(&user).await?;
        owner.link_user(user.id);

        let raw_token = new_reset_token();
        let token = reset_token_entity(
            user.id,
            hash_reset_token(&raw_token),
            Utc::now() + Duration::minutes(self.reset_expires_minutes),
        );
        self.resets.create(&token).await?;

        let link = format!("{}?token={}", self.reset_link_base_url, raw_token);
        let context = serde_json::json!({
            "owner_name": owner.name,
            "unit_label": "",
            "login_link": link,
        });
        self.email
            .send_template_email(
                owner.email.as_str(),
                "Bem-vindo ao portal do proprietário",
                "owner_invitation.html",
                &context,
            )
            .await?;

        tracing::info!(owner_id = %owner.id, user_id = %user.id, "Owner login provisioned");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateOwnerCommand> for OwnerHandler {
    async fn handle(&self, command: CreateOwnerCommand) -> AppResult<Owner> {
        let tenant_id = command.actor.require_tenant()?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        let email = Email::new(&command.email)?;

        let mut owner = Owner::new(tenant_id, command.name, email);
        owner.phone = command.phone;
        owner.cpf = command.cpf;
        owner.audit_info = AuditInfo::new(Some(command.actor.user_id));

        if command.create_login {
            self.provision_login(&mut owner).await?;
        }

        self.owners.create(&owner).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "owner.create",
                "owner",
                owner.id.to_string(),
            ),
        )
        .await;

        Ok(owner)
    }
}

#[async_trait]
impl CommandHandler<UpdateOwnerCommand> for OwnerHandler {
    async fn handle(&self, command: UpdateOwnerCommand) -> AppResult<Owner> {
        let mut owner = self.load_scoped(&command.actor, &command.owner_id).await?;
        command.actor.ensure_admin_scope(&owner.tenant_id)?;

        if let Some(name) = command.name {
            owner.name = name;
        }
        if command.phone.is_some() {
            owner.phone = command.phone;
        }
        if command.cpf.is_some() {
            owner.cpf = command.cpf;
        }
        owner.audit_info.update(Some(command.actor.user_id));

        self.owners.update(&owner).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(owner.tenant_id),
                command.actor.user_id,
                "owner.update",
                "owner",
                owner.id.to_string(),
            ),
        )
        .await;

        Ok(owner)
    }
}

#[async_trait]
impl CommandHandler<DeleteOwnerCommand> for OwnerHandler {
    async fn handle(&self, command: DeleteOwnerCommand) -> AppResult<()> {
        let owner = self.load_scoped(&command.actor, &command.owner_id).await?;
        command.actor.ensure_admin_scope(&owner.tenant_id)?;

        self.owners.delete(&owner.id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(owner.tenant_id),
                command.actor.user_id,
                "owner.delete",
                "owner",
                owner.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetOwnerQuery> for OwnerHandler {
    async fn execute(&self, query: GetOwnerQuery) -> AppResult<Owner> {
        self.load_scoped(&query.actor, &query.owner_id).await
    }
}

#[async_trait]
impl QueryHandler<ListOwnersQuery> for OwnerHandler {
    async fn execute(&self, query: ListOwnersQuery) -> AppResult<PagedResult<Owner>> {
        query.actor.ensure_admin_scope(&query.tenant_id)?;

        self.owners
            .list_by_tenant(&query.tenant_id, &query.pagination)
            .await
    }
}
