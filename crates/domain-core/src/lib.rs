//! obra-domain-core - domain building blocks shared across modules

mod entity;

pub use entity::*;

// Re-export common types
pub use obra_common::{AuditInfo, TenantId, UserId};
