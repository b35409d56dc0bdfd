//! Warranty categories, bulk generation and suspension

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use obra_common::{AuditInfo, TenantId, UnitId, UnitWarrantyId, WarrantyCategoryId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::entities::{AuditLog, UnitWarranty, WarrantyCategory, WarrantyStatus};
use crate::domain::repositories::{
    AuditLogRepository, OwnerRepository, UnitRepository, UnitWarrantyRepository,
    WarrantyCategoryRepository,
};
use crate::domain::services::warranty;

use super::context::{record_audit, Actor};

pub struct CreateCategoryCommand {
    pub actor: Actor,
    pub name: String,
    pub description: Option<String>,
    pub term_years: i32,
    pub term_months: i32,
}

impl Command for CreateCategoryCommand {
    type Result = WarrantyCategory;
}

pub struct UpdateCategoryCommand {
    pub actor: Actor,
    pub category_id: WarrantyCategoryId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub term_years: Option<i32>,
    pub term_months: Option<i32>,
}

impl Command for UpdateCategoryCommand {
    type Result = WarrantyCategory;
}

pub struct DeleteCategoryCommand {
    pub actor: Actor,
    pub category_id: WarrantyCategoryId,
}

impl Command for DeleteCategoryCommand {
    type Result = ();
}

pub struct ListCategoriesQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
}

impl Query for ListCategoriesQuery {
    type Result = Vec<WarrantyCategory>;
}

/// Replace the warranties of the target units with one row per selected
/// category, expiring at `start_date + category term`.
pub struct GenerateWarrantiesCommand {
    pub actor: Actor,
    pub unit_ids: Vec<UnitId>,
    pub category_ids: Vec<WarrantyCategoryId>,
    pub start_date: NaiveDate,
}

impl Command for GenerateWarrantiesCommand {
    type Result = usize;
}

pub struct SuspendWarrantyCommand {
    pub actor: Actor,
    pub warranty_id: UnitWarrantyId,
    pub reason: Option<String>,
}

impl Command for SuspendWarrantyCommand {
    type Result = ();
}

pub struct ReactivateWarrantyCommand {
    pub actor: Actor,
    pub warranty_id: UnitWarrantyId,
}

impl Command for ReactivateWarrantyCommand {
    type Result = ();
}

/// A warranty row with its derived display status
#[derive(Debug, Clone, Serialize)]
pub struct WarrantyView {
    #[serde(flatten)]
    pub warranty: UnitWarranty,
    pub status: WarrantyStatus,
    pub expiring_soon: bool,
}

impl WarrantyView {
    pub fn derive(warranty: UnitWarranty, today: NaiveDate) -> Self {
        let status = warranty::status_on(&warranty, today);
        let expiring_soon = warranty::is_expiring_soon(&warranty, today);
        Self {
            warranty,
            status,
            expiring_soon,
        }
    }
}

pub struct ListUnitWarrantiesQuery {
    pub actor: Actor,
    pub unit_id: UnitId,
}

impl Query for ListUnitWarrantiesQuery {
    type Result = Vec<WarrantyView>;
}

pub struct WarrantyHandler {
    categories: Arc<dyn WarrantyCategoryRepository>,
    warranties: Arc<dyn UnitWarrantyRepository>,
    units: Arc<dyn UnitRepository>,
    owners: Arc<dyn OwnerRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl WarrantyHandler {
    pub fn new(
        categories: Arc<dyn WarrantyCategoryRepository>,
        warranties: Arc<dyn UnitWarrantyRepository>,
        units: Arc<dyn UnitRepository>,
        owners: Arc<dyn OwnerRepository>,
        audit: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            categories,
            warranties,
            units,
            owners,
            audit,
        }
    }

    async fn load_category_scoped(
        &self,
        actor: &Actor,
        id: &WarrantyCategoryId,
    ) -> AppResult<WarrantyCategory> {
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Warranty category not found: {}", id)))?;

        actor.ensure_admin_scope(&category.tenant_id)?;
        Ok(category)
    }

    /// Tenant of the unit a warranty row belongs to, with scope check
    async fn warranty_tenant(
        &self,
        actor: &Actor,
        warranty: &UnitWarranty,
    ) -> AppResult<TenantId> {
        let (_, tenant_id) = self
            .units
            .find_scoped(&warranty.unit_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unit not found: {}", warranty.unit_id)))?;

        actor.ensure_admin_scope(&tenant_id)?;
        Ok(tenant_id)
    }

    fn validate_term(term_years: i32, term_months: i32) -> AppResult<()> {
        if term_years < 0 || term_months < 0 {
            return Err(AppError::validation("Warranty term cannot be negative"));
        }
        if term_years == 0 && term_months == 0 {
            return Err(AppError::validation("Warranty term cannot be zero"));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateCategoryCommand> for WarrantyHandler {
    async fn handle(&self, command: CreateCategoryCommand) -> AppResult<WarrantyCategory> {
        let tenant_id = command.actor.require_tenant()?;
        command.actor.ensure_admin_scope(&tenant_id)?;
        Self::validate_term(command.term_years, command.term_months)?;

        let mut category = WarrantyCategory::new(
            tenant_id,
            command.name,
            command.term_years,
            command.term_months,
        );
        category.description = command.description;
        category.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.categories.create(&category).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "warranty_category.create",
                "warranty_category",
                category.id.to_string(),
            ),
        )
        .await;

        Ok(category)
    }
}

#[async_trait]
impl CommandHandler<UpdateCategoryCommand> for WarrantyHandler {
    async fn handle(&self, command: UpdateCategoryCommand) -> AppResult<WarrantyCategory> {
        let mut category = self
            .load_category_scoped(&command.actor, &command.category_id)
            .await?;

        if let Some(name) = command.name {
            category.name = name;
        }
        if command.description.is_some() {
            category.description = command.description;
        }
        if let Some(years) = command.term_years {
            category.term_years = years;
        }
        if let Some(months) = command.term_months {
            category.term_months = months;
        }
        Self::validate_term(category.term_years, category.term_months)?;
        category.audit_info.update(Some(command.actor.user_id));

        self.categories.update(&category).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(category.tenant_id),
                command.actor.user_id,
                "warranty_category.update",
                "warranty_category",
                category.id.to_string(),
            ),
        )
        .await;

        Ok(category)
    }
}

#[async_trait]
impl CommandHandler<DeleteCategoryCommand> for WarrantyHandler {
    async fn handle(&self, command: DeleteCategoryCommand) -> AppResult<()> {
        let category = self
            .load_category_scoped(&command.actor, &command.category_id)
            .await?;

        self.categories.delete(&category.id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(category.tenant_id),
                command.actor.user_id,
                "warranty_category.delete",
                "warranty_category",
                category.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<ListCategoriesQuery> for WarrantyHandler {
    async fn execute(&self, query: ListCategoriesQuery) -> AppResult<Vec<WarrantyCategory>> {
        query.actor.ensure_tenant_scope(&query.tenant_id)?;

        self.categories.list_by_tenant(&query.tenant_id).await
    }
}

#[async_trait]
impl CommandHandler<GenerateWarrantiesCommand> for WarrantyHandler {
    async fn handle(&self, command: GenerateWarrantiesCommand) -> AppResult<usize> {
        let tenant_id = command.actor.require_tenant()?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        if command.unit_ids.is_empty() {
            return Err(AppError::validation("At least one unit is required"));
        }

        // every target unit must exist inside the caller's tenant
        for unit_id in &command.unit_ids {
            let (_, unit_tenant) = self
                .units
                .find_scoped(unit_id)
                .await?
                .ok_or_else(|| AppError::validation(format!("Unknown unit: {}", unit_id)))?;
            if unit_tenant != tenant_id {
                return Err(AppError::forbidden("Unit belongs to another tenant"));
            }
        }

        // unknown category IDs fail the whole command before anything is written
        let categories = self.categories.find_by_ids(&command.category_ids).await?;
        let found: HashSet<_> = categories.iter().map(|c| c.id).collect();
        for category_id in &command.category_ids {
            if !found.contains(category_id) {
                return Err(AppError::validation(format!(
                    "Unknown warranty category: {}",
                    category_id
                )));
            }
        }
        for category in &categories {
            if category.tenant_id != tenant_id {
                return Err(AppError::forbidden(
                    "Warranty category belongs to another tenant",
                ));
            }
        }

        let mut rows = Vec::with_capacity(command.unit_ids.len() * categories.len());
        for unit_id in &command.unit_ids {
            for category in &categories {
                let expiration = warranty::compute_expiration(command.start_date, category);
                let mut row = UnitWarranty::new(*unit_id, category.id, command.start_date, expiration);
                row.audit_info = AuditInfo::new(Some(command.actor.user_id));
                rows.push(row);
            }
        }

        self.warranties.regenerate(&command.unit_ids, &rows).await?;

        tracing::info!(
            units = command.unit_ids.len(),
            categories = categories.len(),
            rows = rows.len(),
            "Warranties regenerated"
        );

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "warranty.generate",
                "unit_warranty",
                format!("{} units", command.unit_ids.len()),
            )
            .with_detail(serde_json::json!({
                "unit_ids": command.unit_ids,
                "category_ids": command.category_ids,
                "start_date": command.start_date,
            })),
        )
        .await;

        Ok(rows.len())
    }
}

#[async_trait]
impl CommandHandler<SuspendWarrantyCommand> for WarrantyHandler {
    async fn handle(&self, command: SuspendWarrantyCommand) -> AppResult<()> {
        let warranty = self
            .warranties
            .find_by_id(&command.warranty_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Warranty not found: {}", command.warranty_id))
            })?;

        let tenant_id = self.warranty_tenant(&command.actor, &warranty).await?;

        self.warranties
            .set_suspended(&warranty.id, true, command.reason.as_deref())
            .await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "warranty.suspend",
                "unit_warranty",
                warranty.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl CommandHandler<ReactivateWarrantyCommand> for WarrantyHandler {
    async fn handle(&self, command: ReactivateWarrantyCommand) -> AppResult<()> {
        let warranty = self
            .warranties
            .find_by_id(&command.warranty_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Warranty not found: {}", command.warranty_id))
            })?;

        let tenant_id = self.warranty_tenant(&command.actor, &warranty).await?;

        self.warranties
            .set_suspended(&warranty.id, false, None)
            .await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "warranty.reactivate",
                "unit_warranty",
                warranty.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<ListUnitWarrantiesQuery> for WarrantyHandler {
    async fn execute(&self, query: ListUnitWarrantiesQuery) -> AppResult<Vec<WarrantyView>> {
        let (unit, tenant_id) = self
            .units
            .find_scoped(&query.unit_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unit not found: {}", query.unit_id)))?;

        query.actor.ensure_tenant_scope(&tenant_id)?;

        if query.actor.role == obra_auth_core::Role::Owner {
            let owner = self.owners.find_by_user(&query.actor.user_id).await?;
            let owns = matches!((owner, unit.owner_id), (Some(o), Some(u)) if o.id == u);
            if !owns {
                return Err(AppError::forbidden("Unit belongs to another owner"));
            }
        }

        let today = Utc::now().date_naive();
        let rows = self.warranties.list_by_unit(&query.unit_id).await?;

        Ok(rows
            .into_iter()
            .map(|w| WarrantyView::derive(w, today))
            .collect())
    }
}
