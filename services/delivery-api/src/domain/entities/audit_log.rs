//! Audit log entry, appended after every successful write

use chrono::{DateTime, Utc};
use obra_common::{AuditLogId, TenantId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub tenant_id: Option<TenantId>,
    pub user_id: UserId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub detail: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        tenant_id: Option<TenantId>,
        user_id: UserId,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditLogId::new(),
            tenant_id,
            user_id,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}
