//! Marketing leads captured from the public site

use async_trait::async_trait;
use obra_auth_core::{require_role, Role};
use obra_common::{LeadId, PagedResult, Pagination};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, Lead};
use crate::domain::repositories::{AuditLogRepository, LeadRepository};
use crate::domain::value_objects::Email;

use super::context::{record_audit, Actor};

/// Unauthenticated capture from the marketing site
pub struct CaptureLeadCommand {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
}

impl Command for CaptureLeadCommand {
    type Result = Lead;
}

pub struct ConvertLeadCommand {
    pub actor: Actor,
    pub lead_id: LeadId,
}

impl Command for ConvertLeadCommand {
    type Result = ();
}

pub struct ListLeadsQuery {
    pub actor: Actor,
    pub pagination: Pagination,
}

impl Query for ListLeadsQuery {
    type Result = PagedResult<Lead>;
}

pub struct LeadHandler {
    leads: Arc<dyn LeadRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl LeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>, audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { leads, audit }
    }
}

#[async_trait]
impl CommandHandler<CaptureLeadCommand> for LeadHandler {
    async fn handle(&self, command: CaptureLeadCommand) -> AppResult<Lead> {
        if command.company_name.trim().is_empty() || command.contact_name.trim().is_empty() {
            return Err(AppError::validation("Company and contact names are required"));
        }

        let email = Email::new(&command.email)?;

        let mut lead = Lead::new(command.company_name, command.contact_name, email);
        lead.phone = command.phone;
        lead.message = command.message;
        lead.source = command.source;

        self.leads.create(&lead).await?;

        tracing::info!(lead_id = %lead.id, "Lead captured");

        Ok(lead)
    }
}

#[async_trait]
impl CommandHandler<ConvertLeadCommand> for LeadHandler {
    async fn handle(&self, command: ConvertLeadCommand) -> AppResult<()> {
        require_role!(command.actor, Role::Master);

        self.leads.mark_converted(&command.lead_id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                None,
                command.actor.user_id,
                "lead.convert",
                "lead",
                command.lead_id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<ListLeadsQuery> for LeadHandler {
    async fn execute(&self, query: ListLeadsQuery) -> AppResult<PagedResult<Lead>> {
        require_role!(query.actor, Role::Master);

        self.leads.list(&query.pagination).await
    }
}
