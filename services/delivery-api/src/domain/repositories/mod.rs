//! Repository ports implemented by the persistence layer

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

pub use audit_log::AuditLogRepository;
pub use billing::BillingRepository;
pub use document::DocumentRepository;
pub use lead::LeadRepository;
pub use owner::OwnerRepository;
pub use project::ProjectRepository;
pub use tenant::TenantRepository;
pub use unit::UnitRepository;
pub use user::{PasswordResetRepository, PasswordResetToken, UserRepository};
pub use warranty::{UnitWarrantyRepository, WarrantyCategoryRepository};
