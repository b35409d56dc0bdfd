//! Tenant entity (a construction company on the platform)

use obra_common::{AuditInfo, TenantId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub cnpj: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub logo_url: Option<String>,
    pub active: bool,
    pub audit_info: AuditInfo,
}

impl Tenant {
    pub fn new(name: String, slug: String) -> Self {
        Self {
            id: TenantId::new(),
            name,
            slug,
            cnpj: None,
            contact_email: None,
            contact_phone: None,
            logo_url: None,
            active: true,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for Tenant {
    type Id = TenantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Tenant {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
