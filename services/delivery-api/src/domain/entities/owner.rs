//! Owner entity (a proprietário, optionally linked to a login user)

use obra_common::{AuditInfo, OwnerId, TenantId, UserId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Email;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub tenant_id: TenantId,
    pub user_id: Option<UserId>,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub cpf: Option<String>,
    pub audit_info: AuditInfo,
}

impl Owner {
    pub fn new(tenant_id: TenantId, name: String, email: Email) -> Self {
        Self {
            id: OwnerId::new(),
            tenant_id,
            user_id: None,
            name,
            email,
            phone: None,
            cpf: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn link_user(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    pub fn has_login(&self) -> bool {
        self.user_id.is_some()
    }
}

impl Entity for Owner {
    type Id = OwnerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Owner {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
