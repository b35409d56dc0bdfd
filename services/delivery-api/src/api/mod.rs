//! HTTP API: state, router assembly and middleware

pub mod extract;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use obra_auth_core::TokenService;
use obra_bootstrap::Infrastructure;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::application::{
    audit::AuditHandler, auth::AuthHandler, billing::BillingHandler, document::DocumentHandler,
    lead::LeadHandler, owner::OwnerHandler, project::ProjectHandler, tenant::TenantHandler,
    unit::UnitHandler, warranty::WarrantyHandler,
};
use crate::infrastructure::persistence::{
    PostgresAuditLogRepository, PostgresBillingRepository, PostgresDocumentRepository,
    PostgresLeadRepository, PostgresOwnerRepository, PostgresPasswordResetRepository,
    PostgresProjectRepository, PostgresTenantRepository, PostgresUnitRepository,
    PostgresUnitWarrantyRepository, PostgresUserRepository, PostgresWarrantyCategoryRepository,
};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub infra: Arc<Infrastructure>,
    pub tokens: Arc<TokenService>,
    pub metrics: PrometheusHandle,
    pub tenants: Arc<TenantHandler>,
    pub projects: Arc<ProjectHandler>,
    pub units: Arc<UnitHandler>,
    pub owners: Arc<OwnerHandler>,
    pub documents: Arc<DocumentHandler>,
    pub warranties: Arc<WarrantyHandler>,
    pub leads: Arc<LeadHandler>,
    pub auth: Arc<AuthHandler>,
    pub billing: Arc<BillingHandler>,
    pub audit: Arc<AuditHandler>,
}

/// Wire repositories and handlers, then assemble the router
pub fn build_router(infra: Arc<Infrastructure>, metrics: PrometheusHandle) -> Router {
    let pool = infra.postgres_pool();
    let config = infra.config();

    let tenants_repo = Arc::new(PostgresTenantRepository::new(pool.clone()));
    let projects_repo = Arc::new(PostgresProjectRepository::new(pool.clone()));
    let units_repo = Arc::new(PostgresUnitRepository::new(pool.clone()));
    let owners_repo = Arc::new(PostgresOwnerRepository::new(pool.clone()));
    let documents_repo = Arc::new(PostgresDocumentRepository::new(pool.clone()));
    let categories_repo = Arc::new(PostgresWarrantyCategoryRepository::new(pool.clone()));
    let warranties_repo = Arc::new(PostgresUnitWarrantyRepository::new(pool.clone()));
    let leads_repo = Arc::new(PostgresLeadRepository::new(pool.clone()));
    let audit_repo = Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let billing_repo = Arc::new(PostgresBillingRepository::new(pool.clone()));
    let users_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let resets_repo = Arc::new(PostgresPasswordResetRepository::new(pool));

    let reset_base_url = config.password_reset.reset_link_base_url.clone();
    let reset_expires = config.password_reset.token_expires_minutes;
    let presign_expiry = Duration::from_secs(config.storage.presign_expiry_secs);

    let state = AppState {
        tokens: infra.token_service(),
        metrics,
        tenants: Arc::new(TenantHandler::new(tenants_repo, audit_repo.clone())),
        projects: Arc::new(ProjectHandler::new(projects_repo.clone(), audit_repo.clone())),
        units: Arc::new(UnitHandler::new(
            units_repo.clone(),
            projects_repo.clone(),
            owners_repo.clone(),
            audit_repo.clone(),
        )),
        owners: Arc::new(OwnerHandler::new(
            owners_repo.clone(),
            users_repo.clone(),
            resets_repo.clone(),
            infra.email_sender(),
            audit_repo.clone(),
            reset_base_url.clone(),
            reset_expires,
        )),
        documents: Arc::new(DocumentHandler::new(
            documents_repo,
            projects_repo,
            units_repo.clone(),
            owners_repo.clone(),
            infra.storage(),
            audit_repo.clone(),
            presign_expiry,
        )),
        warranties: Arc::new(WarrantyHandler::new(
            categories_repo,
            warranties_repo,
            units_repo,
            owners_repo,
            audit_repo.clone(),
        )),
        leads: Arc::new(LeadHandler::new(leads_repo, audit_repo.clone())),
        auth: Arc::new(AuthHandler::new(
            users_repo,
            resets_repo,
            infra.email_sender(),
            infra.token_service(),
            audit_repo.clone(),
            reset_base_url,
            reset_expires,
        )),
        billing: Arc::new(BillingHandler::new(billing_repo, audit_repo.clone())),
        audit: Arc::new(AuditHandler::new(audit_repo)),
        infra,
    };

    Router::new()
        .route("/health", get(rest::health::health))
        .route("/metrics", get(rest::health::metrics))
        // public POST, MASTER-only GET (enforced in the handler)
        .route(
            "/api/v1/leads",
            post(rest::leads::capture).get(rest::leads::list),
        )
        .route("/api/v1/auth/login", post(rest::auth::login))
        .route("/api/v1/auth/refresh", post(rest::auth::refresh))
        .route(
            "/api/v1/auth/password-reset/request",
            post(rest::auth::request_password_reset),
        )
        .route(
            "/api/v1/auth/password-reset/confirm",
            post(rest::auth::confirm_password_reset),
        )
        // authenticated
        .route("/api/v1/auth/me", get(rest::auth::me))
        .route("/api/v1/users", post(rest::auth::create_user))
        .route(
            "/api/v1/tenants",
            post(rest::tenants::create).get(rest::tenants::list),
        )
        .route(
            "/api/v1/tenants/{id}",
            get(rest::tenants::get).put(rest::tenants::update),
        )
        .route("/api/v1/tenants/{id}/activate", post(rest::tenants::activate))
        .route(
            "/api/v1/tenants/{id}/deactivate",
            post(rest::tenants::deactivate),
        )
        .route(
            "/api/v1/tenants/{id}/billing",
            post(rest::billing::record).get(rest::billing::list),
        )
        .route("/api/v1/billing/{id}/pay", post(rest::billing::mark_paid))
        .route("/api/v1/tenants/{id}/audit-logs", get(rest::audit_logs::list))
        .route(
            "/api/v1/projects",
            post(rest::projects::create).get(rest::projects::list),
        )
        .route(
            "/api/v1/projects/{id}",
            get(rest::projects::get)
                .put(rest::projects::update)
                .delete(rest::projects::remove),
        )
        .route(
            "/api/v1/projects/{id}/units",
            post(rest::units::create).get(rest::units::list),
        )
        .route(
            "/api/v1/units/{id}",
            get(rest::units::get)
                .put(rest::units::update)
                .delete(rest::units::remove),
        )
        .route("/api/v1/units/{id}/owner", put(rest::units::assign_owner))
        .route("/api/v1/units/{id}/warranties", get(rest::warranties::list_for_unit))
        .route("/api/v1/me/units", get(rest::units::list_mine))
        .route(
            "/api/v1/owners",
            post(rest::owners::create).get(rest::owners::list),
        )
        .route(
            "/api/v1/owners/{id}",
            get(rest::owners::get)
                .put(rest::owners::update)
                .delete(rest::owners::remove),
        )
        .route(
            "/api/v1/warranty-categories",
            post(rest::warranties::create_category).get(rest::warranties::list_categories),
        )
        .route(
            "/api/v1/warranty-categories/{id}",
            put(rest::warranties::update_category).delete(rest::warranties::delete_category),
        )
        .route("/api/v1/warranties/generate", post(rest::warranties::generate))
        .route(
            "/api/v1/warranties/{id}/suspend",
            post(rest::warranties::suspend),
        )
        .route(
            "/api/v1/warranties/{id}/reactivate",
            post(rest::warranties::reactivate),
        )
        .route(
            "/api/v1/documents",
            post(rest::documents::upload).get(rest::documents::list),
        )
        .route(
            "/api/v1/documents/{id}",
            get(rest::documents::get).delete(rest::documents::remove),
        )
        .route(
            "/api/v1/documents/{id}/versions",
            post(rest::documents::add_version).get(rest::documents::list_versions),
        )
        .route(
            "/api/v1/documents/{id}/download",
            get(rest::documents::download_url),
        )
        .route("/api/v1/leads/{id}/convert", post(rest::leads::convert))
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Per-request counter keyed by matched route, not raw path
async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    obra_telemetry::record_http_request(method.as_str(), &path, response.status().as_u16());

    response
}
