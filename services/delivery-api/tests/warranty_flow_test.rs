use std::sync::Arc;

use chrono::NaiveDate;
use delivery_api::application::warranty::{
    GenerateWarrantiesCommand, ListUnitWarrantiesQuery, ReactivateWarrantyCommand,
    SuspendWarrantyCommand, WarrantyHandler,
};
use delivery_api::application::Actor;
use delivery_api::domain::entities::{Project, Tenant, Unit, WarrantyCategory, WarrantyStatus};
use delivery_api::domain::repositories::{
    ProjectRepository, TenantRepository, UnitRepository, UnitWarrantyRepository,
    WarrantyCategoryRepository,
};
use delivery_api::infrastructure::persistence::{
    PostgresAuditLogRepository, PostgresOwnerRepository, PostgresProjectRepository,
    PostgresTenantRepository, PostgresUnitRepository, PostgresUnitWarrantyRepository,
    PostgresWarrantyCategoryRepository,
};
use obra_auth_core::Role;
use obra_common::{UserId, WarrantyCategoryId};
use obra_cqrs_core::{CommandHandler, QueryHandler};
use obra_errors::AppError;
use sqlx::PgPool;

struct Ctx {
    handler: WarrantyHandler,
    actor: Actor,
    unit: Unit,
    structural: WarrantyCategory,
    waterproofing: WarrantyCategory,
    warranties: Arc<PostgresUnitWarrantyRepository>,
    categories: Arc<PostgresWarrantyCategoryRepository>,
    tenants: PostgresTenantRepository,
}

async fn seed(pool: &PgPool) -> Ctx {
    let tenants = PostgresTenantRepository::new(pool.clone());
    let projects = PostgresProjectRepository::new(pool.clone());
    let units = Arc::new(PostgresUnitRepository::new(pool.clone()));
    let owners = Arc::new(PostgresOwnerRepository::new(pool.clone()));
    let categories = Arc::new(PostgresWarrantyCategoryRepository::new(pool.clone()));
    let warranties = Arc::new(PostgresUnitWarrantyRepository::new(pool.clone()));
    let audit = Arc::new(PostgresAuditLogRepository::new(pool.clone()));

    let tenant = Tenant::new("Construtora Alfa".to_string(), "alfa".to_string());
    tenants.create(&tenant).await.unwrap();

    let project = Project::new(tenant.id, "Residencial Aurora".to_string());
    projects.create(&project).await.unwrap();

    let unit = Unit::new(project.id, "APT 101".to_string());
    units.create(&unit).await.unwrap();

    let structural = WarrantyCategory::new(tenant.id, "Estrutura".to_string(), 5, 0);
    categories.create(&structural).await.unwrap();

    let waterproofing = WarrantyCategory::new(tenant.id, "Impermeabilização".to_string(), 10, 0);
    categories.create(&waterproofing).await.unwrap();

    let actor = Actor {
        user_id: UserId::new(),
        tenant_id: Some(tenant.id),
        role: Role::Admin,
    };

    let handler = WarrantyHandler::new(
        categories.clone(),
        warranties.clone(),
        units,
        owners,
        audit,
    );

    Ctx {
        handler,
        actor,
        unit,
        structural,
        waterproofing,
        warranties,
        categories,
        tenants,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_generate_computes_expiration_from_category_terms(pool: PgPool) {
    let ctx = seed(&pool).await;

    let created = ctx
        .handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id, ctx.waterproofing.id],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap();

    assert_eq!(created, 2);

    let rows = ctx.warranties.list_by_unit(&ctx.unit.id).await.unwrap();
    assert_eq!(rows.len(), 2);

    let structural = rows
        .iter()
        .find(|w| w.category_id == ctx.structural.id)
        .unwrap();
    assert_eq!(structural.expiration_date, date(2030, 1, 1));

    let waterproofing = rows
        .iter()
        .find(|w| w.category_id == ctx.waterproofing.id)
        .unwrap();
    assert_eq!(waterproofing.expiration_date, date(2035, 1, 1));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_regenerate_replaces_existing_rows(pool: PgPool) {
    let ctx = seed(&pool).await;

    ctx.handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id, ctx.waterproofing.id],
            start_date: date(2024, 6, 1),
        })
        .await
        .unwrap();

    ctx.handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id, ctx.waterproofing.id],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap();

    let rows = ctx.warranties.list_by_unit(&ctx.unit.id).await.unwrap();
    assert_eq!(rows.len(), 2, "old rows must be replaced, not appended");
    assert!(rows.iter().all(|w| w.start_date == date(2025, 1, 1)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_regenerate_with_no_categories_clears_unit(pool: PgPool) {
    let ctx = seed(&pool).await;

    ctx.handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id, ctx.waterproofing.id],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap();

    let created = ctx
        .handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap();

    assert_eq!(created, 0);
    assert!(ctx
        .warranties
        .list_by_unit(&ctx.unit.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_suspend_and_reactivate(pool: PgPool) {
    let ctx = seed(&pool).await;

    ctx.handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap();

    let warranty_id = ctx.warranties.list_by_unit(&ctx.unit.id).await.unwrap()[0].id;

    ctx.handler
        .handle(SuspendWarrantyCommand {
            actor: ctx.actor.clone(),
            warranty_id,
            reason: Some("Reforma não autorizada".to_string()),
        })
        .await
        .unwrap();

    let views = ctx
        .handler
        .execute(ListUnitWarrantiesQuery {
            actor: ctx.actor.clone(),
            unit_id: ctx.unit.id,
        })
        .await
        .unwrap();
    assert_eq!(views[0].status, WarrantyStatus::Suspensa);
    assert!(!views[0].expiring_soon);

    ctx.handler
        .handle(ReactivateWarrantyCommand {
            actor: ctx.actor.clone(),
            warranty_id,
        })
        .await
        .unwrap();

    let views = ctx
        .handler
        .execute(ListUnitWarrantiesQuery {
            actor: ctx.actor.clone(),
            unit_id: ctx.unit.id,
        })
        .await
        .unwrap();
    assert_eq!(views[0].status, WarrantyStatus::Vigente);
    assert!(views[0].warranty.suspended_reason.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_generate_rejects_category_of_another_tenant(pool: PgPool) {
    let ctx = seed(&pool).await;

    let other_tenant = Tenant::new("Construtora Beta".to_string(), "beta".to_string());
    ctx.tenants.create(&other_tenant).await.unwrap();

    let foreign = WarrantyCategory::new(other_tenant.id, "Elétrica".to_string(), 3, 0);
    ctx.categories.create(&foreign).await.unwrap();

    let err = ctx
        .handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![foreign.id],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(ctx
        .warranties
        .list_by_unit(&ctx.unit.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_generate_fails_whole_command_on_unknown_category(pool: PgPool) {
    let ctx = seed(&pool).await;

    let err = ctx
        .handler
        .handle(GenerateWarrantiesCommand {
            actor: ctx.actor.clone(),
            unit_ids: vec![ctx.unit.id],
            category_ids: vec![ctx.structural.id, WarrantyCategoryId::new()],
            start_date: date(2025, 1, 1),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(
        ctx.warranties
            .list_by_unit(&ctx.unit.id)
            .await
            .unwrap()
            .is_empty(),
        "nothing may be written when one category is unknown"
    );
}
