use std::sync::Arc;

use delivery_api::application::project::{CreateProjectCommand, GetProjectQuery, ProjectHandler};
use delivery_api::application::tenant::{CreateTenantCommand, TenantHandler};
use delivery_api::application::Actor;
use delivery_api::domain::entities::Tenant;
use delivery_api::domain::repositories::TenantRepository;
use delivery_api::infrastructure::persistence::{
    PostgresAuditLogRepository, PostgresProjectRepository, PostgresTenantRepository,
};
use obra_auth_core::Role;
use obra_common::{TenantId, UserId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use sqlx::PgPool;

fn master() -> Actor {
    Actor {
        user_id: UserId::new(),
        tenant_id: None,
        role: Role::Master,
    }
}

fn admin(tenant_id: TenantId) -> Actor {
    Actor {
        user_id: UserId::new(),
        tenant_id: Some(tenant_id),
        role: Role::Admin,
    }
}

fn tenant_handler(pool: &PgPool) -> TenantHandler {
    TenantHandler::new(
        Arc::new(PostgresTenantRepository::new(pool.clone())),
        Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    )
}

fn project_handler(pool: &PgPool) -> ProjectHandler {
    ProjectHandler::new(
        Arc::new(PostgresProjectRepository::new(pool.clone())),
        Arc::new(PostgresAuditLogRepository::new(pool.clone())),
    )
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_master_creates_tenants(pool: PgPool) {
    let handler = tenant_handler(&pool);

    let err = handler
        .handle(CreateTenantCommand {
            actor: admin(TenantId::new()),
            name: "Construtora Alfa".to_string(),
            slug: "alfa".to_string(),
            cnpj: None,
            contact_email: None,
            contact_phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_slug_is_a_conflict(pool: PgPool) {
    let handler = tenant_handler(&pool);

    handler
        .handle(CreateTenantCommand {
            actor: master(),
            name: "Construtora Alfa".to_string(),
            slug: "alfa".to_string(),
            cnpj: None,
            contact_email: None,
            contact_phone: None,
        })
        .await
        .unwrap();

    let err = handler
        .handle(CreateTenantCommand {
            actor: master(),
            name: "Outra Construtora".to_string(),
            slug: "alfa".to_string(),
            cnpj: None,
            contact_email: None,
            contact_phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_slug_must_be_url_safe(pool: PgPool) {
    let handler = tenant_handler(&pool);

    let err = handler
        .handle(CreateTenantCommand {
            actor: master(),
            name: "Construtora Alfa".to_string(),
            slug: "Alfa Ltda".to_string(),
            cnpj: None,
            contact_email: None,
            contact_phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_read_projects_of_another_tenant(pool: PgPool) {
    let tenants = PostgresTenantRepository::new(pool.clone());
    let projects = project_handler(&pool);

    let tenant_a = Tenant::new("Construtora Alfa".to_string(), "alfa".to_string());
    let tenant_b = Tenant::new("Construtora Beta".to_string(), "beta".to_string());
    tenants.create(&tenant_a).await.unwrap();
    tenants.create(&tenant_b).await.unwrap();

    let project = projects
        .handle(CreateProjectCommand {
            actor: admin(tenant_a.id),
            name: "Residencial Aurora".to_string(),
            address: None,
            city: None,
            state: None,
            delivery_date: None,
            description: None,
        })
        .await
        .unwrap();

    let err = projects
        .execute(GetProjectQuery {
            actor: admin(tenant_b.id),
            project_id: project.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // MASTER reads across tenants
    let found = projects
        .execute(GetProjectQuery {
            actor: master(),
            project_id: project.id,
        })
        .await
        .unwrap();
    assert_eq!(found.id, project.id);
}
