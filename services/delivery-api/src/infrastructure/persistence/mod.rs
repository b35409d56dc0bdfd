//! PostgreSQL repository implementations

mod audit_log;
mod billing;
mod document;
mod lead;
mod owner;
mod project;
mod tenant;
mod unit;
mod user;
mod warranty;

pub use audit_log::PostgresAuditLogRepository;
pub use billing::PostgresBillingRepository;
pub use document::PostgresDocumentRepository;
pub use lead::PostgresLeadRepository;
pub use owner::PostgresOwnerRepository;
pub use project::PostgresProjectRepository;
pub use tenant::PostgresTenantRepository;
pub use unit::PostgresUnitRepository;
pub use user::{PostgresPasswordResetRepository, PostgresUserRepository};
pub use warranty::{PostgresUnitWarrantyRepository, PostgresWarrantyCategoryRepository};
