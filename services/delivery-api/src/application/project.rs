//! Project management

use async_trait::async_trait;
use chrono::NaiveDate;
use obra_common::{AuditInfo, PagedResult, Pagination, ProjectId, TenantId};
use obra_cqrs_core::{Command, CommandHandler, Query, QueryHandler};
use obra_errors::{AppError, AppResult};
use std::sync::Arc;

use crate::domain::entities::{AuditLog, Project, ProjectStatus};
use crate::domain::repositories::{AuditLogRepository, ProjectRepository};

use super::context::{record_audit, Actor};

pub struct CreateProjectCommand {
    pub actor: Actor,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl Command for CreateProjectCommand {
    type Result = Project;
}

pub struct UpdateProjectCommand {
    pub actor: Actor,
    pub project_id: ProjectId,
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl Command for UpdateProjectCommand {
    type Result = Project;
}

pub struct DeleteProjectCommand {
    pub actor: Actor,
    pub project_id: ProjectId,
}

impl Command for DeleteProjectCommand {
    type Result = ();
}

pub struct GetProjectQuery {
    pub actor: Actor,
    pub project_id: ProjectId,
}

impl Query for GetProjectQuery {
    type Result = Project;
}

pub struct ListProjectsQuery {
    pub actor: Actor,
    pub tenant_id: TenantId,
    pub pagination: Pagination,
}

impl Query for ListProjectsQuery {
    type Result = PagedResult<Project>;
}

pub struct ProjectHandler {
    projects: Arc<dyn ProjectRepository>,
    audit: Arc<dyn AuditLogRepository>,
}

impl ProjectHandler {
    pub fn new(projects: Arc<dyn ProjectRepository>, audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { projects, audit }
    }

    async fn load_scoped(&self, actor: &Actor, project_id: &ProjectId) -> AppResult<Project> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project not found: {}", project_id)))?;

        actor.ensure_tenant_scope(&project.tenant_id)?;
        Ok(project)
    }
}

#[async_trait]
impl CommandHandler<CreateProjectCommand> for ProjectHandler {
    async fn handle(&self, command: CreateProjectCommand) -> AppResult<Project> {
        let tenant_id = command.actor.require_tenant()?;
        command.actor.ensure_admin_scope(&tenant_id)?;

        if command.name.trim().is_empty() {
            return Err(AppError::validation("Project name is required"));
        }

        let mut project = Project::new(tenant_id, command.name);
        project.address = command.address;
        project.city = command.city;
        project.state = command.state;
        project.delivery_date = command.delivery_date;
        project.description = command.description;
        project.audit_info = AuditInfo::new(Some(command.actor.user_id));

        self.projects.create(&project).await?;

        tracing::info!(project_id = %project.id, tenant_id = %tenant_id, "Project created");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(tenant_id),
                command.actor.user_id,
                "project.create",
                "project",
                project.id.to_string(),
            ),
        )
        .await;

        Ok(project)
    }
}

#[async_trait]
impl CommandHandler<UpdateProjectCommand> for ProjectHandler {
    async fn handle(&self, command: UpdateProjectCommand) -> AppResult<Project> {
        let mut project = self.load_scoped(&command.actor, &command.project_id).await?;
        command.actor.ensure_admin_scope(&project.tenant_id)?;

        if let Some(name) = command.name {
            project.name = name;
        }
        if command.address.is_some() {
            project.address = command.address;
        }
        if command.city.is_some() {
            project.city = command.city;
        }
        if command.state.is_some() {
            project.state = command.state;
        }
        if command.delivery_date.is_some() {
            project.delivery_date = command.delivery_date;
        }
        if command.description.is_some() {
            project.description = command.description;
        }
        if let Some(status) = command.status {
            project.status = status;
        }
        project.audit_info.update(Some(command.actor.user_id));

        self.projects.update(&project).await?;

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(project.tenant_id),
                command.actor.user_id,
                "project.update",
                "project",
                project.id.to_string(),
            ),
        )
        .await;

        Ok(project)
    }
}

#[async_trait]
impl CommandHandler<DeleteProjectCommand> for ProjectHandler {
    async fn handle(&self, command: DeleteProjectCommand) -> AppResult<()> {
        let project = self.load_scoped(&command.actor, &command.project_id).await?;
        command.actor.ensure_admin_scope(&project.tenant_id)?;

        self.projects.delete(&project.id).await?;

        tracing::info!(project_id = %project.id, "Project deleted");

        record_audit(
            self.audit.as_ref(),
            AuditLog::new(
                Some(project.tenant_id),
                command.actor.user_id,
                "project.delete",
                "project",
                project.id.to_string(),
            ),
        )
        .await;

        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetProjectQuery> for ProjectHandler {
    async fn execute(&self, query: GetProjectQuery) -> AppResult<Project> {
        self.load_scoped(&query.actor, &query.project_id).await
    }
}

#[async_trait]
impl QueryHandler<ListProjectsQuery> for ProjectHandler {
    async fn execute(&self, query: ListProjectsQuery) -> AppResult<PagedResult<Project>> {
        query.actor.ensure_tenant_scope(&query.tenant_id)?;

        self.projects
            .list_by_tenant(&query.tenant_id, &query.pagination)
            .await
    }
}
