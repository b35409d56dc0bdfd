//! Tenant billing history

use async_trait::async_trait;
use chrono::NaiveDate;
use obra_auth_core::{require_role, Role};
use obra_common::{BillingEntryId, PagedResult, Pagination, TenantId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, BillingEntry};
use crate::domain::repositories::{AuditLogRepository, BillingRepository};

use super::context::{record_audit, Actor};

pub struct RecordBillingEntryCommand {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub description: String,
    pub amount_cents: i64,
    pub reference_month: NaiveDate,
    pub paid: bool,
}

impl Command for RecordBillingEntryCommand {
    type Result = BillingEntry;
}

pub struct MarkBillingPaidCommand {
    pub actor: Actor,
    pub entry_id: BillingEntryId,
}

impl Command for MarkBillingPaidCommand {
    type Result = ();
}

pub struct ListBillingQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub pagination: Pagination,
}

impl Query for ListBillingQuery {
    type Result = PagedResult<BillingEntry>;
}

pub struct BillingHandler {
    billing: Arc<dyn BillingRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl BillingHandler {
    pub fn new(billing: Arc<dyn BillingRepository>, audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { billing, audit }
    }
}

#[async_trait]
impl CommandHandler<RecordBillingEntryCommand> for BillingHandler {
    async fn handle(&self, command: RecordBillingEntryCommand) -> AppResult<BillingEntry> {
        require_role!(command.actor, Role::Master);

        if command.amount_cents <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }
        if command.description.trim().is_empty() {
            return Err(AppError::validation("Description is required"));
        }

        let mut entry = BillingEntry::new(
            command.tenant_id,
            command.description,
            command.amount_cents,
            command.reference_month,
        );
        if command.paid {
            entry.mark_paid();
        }

        self.billing.create(&entry).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(command.tenant_id),
                command.actor.user_id,
                "billing.record",
                "billing_entry",
                entry.id.to_string(),
            ),
        )
        .await;

        Ok(entry)
    }
}

#[async_trait]
impl CommandHandler<MarkBillingPaidCommand> for BillingHandler {
    async fn handle(&self, command: MarkBillingPaidCommand) -> AppResult<()> {
        require_role!(command.actor, Role::Master);

        let entry = self
            .billing
            .find_by_id(&command.entry_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Billing entry not found: {}", command.entry_id))
            })?;

        self.billing.mark_paid(&entry.id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(entry.tenant_id),
                command.actor.user_id,
                "billing.mark_paid",
                "billing_entry",
                entry.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<ListBillingQuery> for BillingHandler {
    async fn execute(&self, query: ListBillingQuery) -> AppResult<PagedResult<BillingEntry>> {
        // MASTER lists any tenant; ADMIN only their own
        query.actor.ensure_admin_scope(&query.tenant_id)?;

        self.billing
            .list_by_tenant(&query.tenant_id, &query.pagination)
            .await
    }
}
