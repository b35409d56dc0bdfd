//! Unit management

use async_trait::async_trait;
use obra_auth_core::Role;
use obra_common::{AuditInfo, OwnerId, PagedResult, Pagination, ProjectId, UnitId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, Unit};
use crate::domain::repositories::{
    AuditLogRepository, OwnerRepository, ProjectRepository, UnitRepository,
};

use super::context::{record_audit, Actor};

pub struct CreateUnitCommand {
    pub actor: Actor,
    pub project_id: ProjectId,
    pub identifier: String,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
}

impl Command for CreateUnitCommand {
    type Result = Unit;
}

pub struct UpdateUnitCommand {
    pub actor: Actor,
    pub unit_id: UnitId,
    pub identifier: Option<String>,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
    pub mark_delivered: bool,
}

impl Command for UpdateUnitCommand {
    type Result = Unit;
}

pub struct AssignOwnerCommand {
    pub actor: Actor,
    pub unit_id: UnitId,
    /// None unassigns the current owner
    pub owner_id: Option<OwnerId>,
}

impl Command for AssignOwnerCommand {
    type Result = Unit;
}

pub struct DeleteUnitCommand {
    pub actor: Actor,
    pub unit_id: UnitId,
}

impl Command for DeleteUnitCommand {
    type Result = ();
}

pub struct GetUnitQuery {
    pub actor: Actor,
    pub unit_id: UnitId,
}

impl Query for GetUnitQuery {
    type Result = Unit;
}

pub struct ListUnitsQuery {
    pub actor: Actor,
    pub project_id: ProjectId,
    pub pagination: Pagination,
}

impl Query for ListUnitsQuery {
    type Result = PagedResult<Unit>;
}

/// Units belonging to the calling OWNER
pub struct ListMyUnitsQuery {
    pub actor: Actor,
}

impl Query for ListMyUnitsQuery {
    type Result = Vec<Unit>;
}

pub struct UnitHandler {
    units: Arc<dyn UnitRepository>,
    projects: Arc<dyn ProjectRepository>,
    owners: Arc<dyn OwnerRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl UnitHandler {
    pub fn new(
        units: Arc<dyn UnitRepository>,
        projects: Arc<dyn ProjectRepository>,
        owners: Arc<dyn OwnerRepository>,
        audit: Arc<dyn AuditLogRepository>,
    ) -> Self {
        Self {
            units,
            projects,
            owners,
            audit,
        }
    }

    async fn load_scoped(&self, actor: &Actor, unit_id: &UnitId) -> AppResult<(Unit, obra_common::TenantId)> {
        let (unit, tenant_id) = self
            .units
            .find_scoped(unit_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Unit not found: {}", unit_id)))?;

        actor.ensure_tenant_scope(&tenant_id)?;

        // an OWNER may only see units assigned to them
        if actor.role == Role::Owner {
            let owner = self.owners.find_by_user(&actor.user_id).await?;
            let owns = matches!((owner, unit.owner_id), (Some(o), Some(u)) if o.id == u);
            if !owns {
                return Err(AppError::forbidden("Unit belongs to another owner"));
            }
        }

        Ok((unit, tenant_id))
    }
}

#[async_trait]
impl CommandHandler<CreateUnitCommand> for UnitHandler {
    async fn handle(&self, command: CreateUnitCommand) -> AppResult<Unit> {
        let project = self
            .projects
            .find_by_id(&command.project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project not found: {}", command.project_id)))?;

        command.actor.ensure_admin_scope(&project.tenant_id)?;

        if command.identifier.trim().is_empty() {
            return Err(AppError::validation("Unit identifier is required"));
        }

        let mut unit = Unit::new(project.id, command.identifier);
        unit.floor = command.floor;
        unit.area_m2 = command.area_m2;
        unit.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.units.create(&unit).await?;

        tracing::info!(unit_id = %unit.id, project_id = %project.id, "Unit created");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(project.tenant_id),
                command.actor.user_id,
                "unit.create",
                "unit",
                unit.id.to_string(),
            ),
        )
        .await;

        Ok(unit)
    }
}

#[async_trait]
impl CommandHandler<UpdateUnitCommand> for UnitHandler {
    async fn handle(&self, command: UpdateUnitCommand) -> AppResult<Unit> {
        let (mut unit, tenant_id) = self.load_scoped(&command.actor, &command.unit_id).await?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        if let Some(identifier) = command.identifier {
            unit.identifier = identifier;
        }
        if command.floor.is_some() {
            unit.floor = command.floor;
        }
        if command.area_m2.is_some() {
            unit.area_m2 = command.area_m2;
        }
        if command.mark_delivered && !unit.is_delivered() {
            unit.mark_delivered();
        }
        unit.audit_info.update(Some(command.actor.user_id));

        self.units.update(&unit).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "unit.update",
                "unit",
                unit.id.to_string(),
            ),
        )
        .await;

        Ok(unit)
    }
}

#[async_trait]
impl CommandHandler<AssignOwnerCommand> for UnitHandler {
    async fn handle(&self, command: AssignOwnerCommand) -> AppResult<Unit> {
        let (mut unit, tenant_id) = self.load_scoped(&command.actor, &command.unit_id).await?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        match command.owner_id {
            Some(owner_id) => {
                let owner = self
                    .owners
                    .find_by_id(&owner_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Owner not found: {}", owner_id)))?;

                if owner.tenant_id != tenant_id {
                    return Err(AppError::forbidden("Owner belongs to another tenant"));
                }

                unit.assign_owner(owner.id);
            }
            None => unit.unassign_owner(),
        }
        unit.audit_info.update(Some(command.actor.user_id));

        self.units.update(&unit).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "unit.assign_owner",
                "unit",
                unit.id.to_string(),
            ),
        )
        .await;

        Ok(unit)
    }
}

#[async_trait]
impl CommandHandler<DeleteUnitCommand> for UnitHandler {
    async fn handle(&self, command: DeleteUnitCommand) -> AppResult<()> {
        let (unit, tenant_id) = self.load_scoped(&command.actor, &command.unit_id).await?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        self.units.delete(&unit.id).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "unit.delete",
                "unit",
                unit.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetUnitQuery> for UnitHandler {
    async fn execute(&self, query: GetUnitQuery) -> AppResult<Unit> {
        let (unit, _) = self.load_scoped(&query.actor, &query.unit_id).await?;
        Ok(unit)
    }
}

#[async_trait]
impl QueryHandler<ListUnitsQuery> for UnitHandler {
    async fn execute(&self, query: ListUnitsQuery) -> AppResult<PagedResult<Unit>> {
        let project = self
            .projects
            .find_by_id(&query.project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project not found: {}", query.project_id)))?;

        query.actor.ensure_tenant_scope(&project.tenant_id)?;

        self.units
            .list_by_project(&project.id, &query.pagination)
            .await
    }
}

#[async_trait]
impl QueryHandler<ListMyUnitsQuery> for UnitHandler {
    async fn execute(&self, query: ListMyUnitsQuery) -> AppResult<Vec<Unit>> {
        let owner = self
            .owners
            .find_by_user(&query.actor.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("No owner record linked to this account"))?;

        self.units.list_by_owner(&owner.id).await
    }
}
