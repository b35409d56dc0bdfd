//! Tenant management (MASTER only)

use async_trait::async_trait;
use obra_auth_core::{require_role, Role};
use obra_common::{AuditInfo, PagedResult, Pagination, TenantId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, Tenant};
use crate::domain::repositories::{AuditLogRepository, TenantRepository};

use super::context::{record_audit, Actor};

pub struct CreateTenantCommand {
    pub actor: Actor,
    pub name: String,
    pub slug: String,
    pub cnpj: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl Command for CreateTenantCommand {
    type Result = Tenant;
}

pub struct UpdateTenantCommand {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub name: Option<String>,
    pub cnpj: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
}

impl Command for UpdateTenantCommand {
    type Result = Tenant;
}

pub struct SetTenantActiveCommand {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub active: bool,
}

impl Command for SetTenantActiveCommand {
    type Result = ();
}

pub struct GetTenantQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
}

impl Query for GetTenantQuery {
    type Result = Tenant;
}

pub struct ListTenantsQuery {
    pub actor: Actor,
    pub pagination: Pagination,
}

impl Query for ListTenantsQuery {
    type Result = PagedResult<Tenant>;
}

pub struct TenantHandler {
    tenants: Arc<dyn TenantRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl TenantHandler {
    pub fn new(tenants: Arc<dyn TenantRepository>, audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { tenants, audit }
    }
}

#[async_trait]
impl CommandHandler<CreateTenantCommand> for TenantHandler {
    async fn handle(&self, command: CreateTenantCommand) -> AppResult<Tenant> {
        require_role!(command.actor, Role::Master);

        if command.slug.is_empty()
            || !command.slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(AppError::validation(
                "Slug must be lowercase letters, digits and hyphens",
            ));
        }

        if self.tenants.find_by_slug(&command.slug).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Tenant slug already in use: {}",
                command.slug
            )));
        }

        let mut tenant = Tenant::new(command.name, command.slug);
        tenant.cnpj = command.cnpj;
        tenant.contact_email = command.contact_email;
        tenant.contact_phone = command.contact_phone;
        tenant.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.tenants.create(&tenant).await?;

        tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "Tenant created");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant.id),
                command.actor.user_id,
                "tenant.create",
                "tenant",
                tenant.id.to_string(),
            ),
        )
        .await;

        Ok(tenant)
    }
}

#[async_trait]
impl CommandHandler<UpdateTenantCommand> for TenantHandler {
    async fn handle(&self, command: UpdateTenantCommand) -> AppResult<Tenant> {
        require_role!(command.actor, Role::Master);

        let mut tenant = self
            .tenants
            .find_by_id(&command.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant not found: {}", command.tenant_id)))?;

        if let Some(name) = command.name {
            tenant.name = name;
        }
        if command.cnpj.is_some() {
            tenant.cnpj = command.cnpj;
        }
        if command.contact_email.is_some() {
            tenant.contact_email = command.contact_email;
        }
        if command.contact_phone.is_some() {
            tenant.contact_phone = command.contact_phone;
        }
        if command.logo_url.is_some() {
            tenant.logo_url = command.logo_url;
        }
        tenant.audit_info.update(Some(command.actor.user_id));

        self.tenants.update(&tenant).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant.id),
                command.actor.user_id,
                "tenant.update",
                "tenant",
                tenant.id.to_string(),
            ),
        )
        .await;

        Ok(tenant)
    }
}

#[async_trait]
impl CommandHandler<SetTenantActiveCommand> for TenantHandler {
    async fn handle(&self, command: SetTenantActiveCommand) -> AppResult<()> {
        require_role!(command.actor, Role::Master);

        let mut tenant = self
            .tenants
            .find_by_id(&command.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant not found: {}", command.tenant_id)))?;

        if command.active {
            tenant.activate();
        } else {
            tenant.deactivate();
        }
        tenant.audit_info.update(Some(command.actor.user_id));

        self.tenants.update(&tenant).await?;

        tracing::info!(tenant_id = %tenant.id, active = command.active, "Tenant active flag changed");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant.id),
                command.actor.user_id,
                if command.active { "tenant.activate" } else { "tenant.deactivate" },
                "tenant",
                tenant.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetTenantQuery> for TenantHandler {
    async fn execute(&self, query: GetTenantQuery) -> AppResult<Tenant> {
        query.actor.ensure_tenant_scope(&query.tenant_id)?;

        self.tenants
            .find_by_id(&query.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant not found: {}", query.tenant_id)))
    }
}

#[async_trait]
impl QueryHandler<ListTenantsQuery> for TenantHandler {
    async fn execute(&self, query: ListTenantsQuery) -> AppResult<PagedResult<Tenant>> {
        require_role!(query.actor, Role::Master);

        self.tenants.list(&query.pagination).await
    }
}
