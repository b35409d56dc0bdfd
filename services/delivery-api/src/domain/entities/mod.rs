//! Domain entities

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

pub use audit_log::AuditLog;
pub use billing::BillingEntry;
pub use document::{object_key, Document, DocumentVersion};
pub use lead::Lead;
pub use owner::Owner;
pub use project::{Project, ProjectStatus};
pub use tenant::Tenant;
pub use unit::Unit;
pub use user::{User, UserStatus};
pub use warranty::{UnitWarranty, WarrantyCategory, WarrantyStatus};
