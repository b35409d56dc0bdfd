//! Project entity (an empreendimento under construction or delivered)

use chrono::NaiveDate;
use obra_common::{AuditInfo, ProjectId, TenantId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planejamento,
    EmObra,
    Entregue,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planejamento => "PLANEJAMENTO",
            Self::EmObra => "EM_OBRA",
            Self::Entregue => "ENTREGUE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLANEJAMENTO" => Some(Self::Planejamento),
            "EM_OBRA" => Some(Self::EmObra),
            "ENTREGUE" => Some(Self::Entregue),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub tenant_id: TenantId,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub audit_info: AuditInfo,
}

impl Project {
    pub fn new(tenant_id: TenantId, name: String) -> Self {
        Self {
            id: ProjectId::new(),
            tenant_id,
            name,
            address: None,
            city: None,
            state: None,
            delivery_date: None,
            description: None,
            status: ProjectStatus::Planejamento,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn mark_delivered(&mut self, date: NaiveDate) {
        self.status = ProjectStatus::Entregue;
        self.delivery_date = Some(date);
    }
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Project {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
