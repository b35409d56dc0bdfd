//! Unit entity (a sellable unit inside a project, e.g. "Bloco A ap 101")

use chrono::{DateTime, Utc};
use obra_common::{AuditInfo, OwnerId, ProjectId, UnitId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub project_id: ProjectId,
    pub owner_id: Option<OwnerId>,
    pub identifier: String,
    pub floor: Option<i32>,
    pub area_m2: Option<f64>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub audit_info: AuditInfo,
}

impl Unit {
    pub fn new(project_id: ProjectId, identifier: String) -> Self {
        Self {
            id: UnitId::new(),
            project_id,
            owner_id: None,
            identifier,
            floor: None,
            area_m2: None,
            delivered_at: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn assign_owner(&mut self, owner_id: OwnerId) {
        self.owner_id = Some(owner_id);
    }

    pub fn unassign_owner(&mut self) {
        self.owner_id = None;
    }

    pub fn mark_delivered(&mut self) {
        self.delivered_at = Some(Utc::now());
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }
}

impl Entity for Unit {
    type Id = UnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Unit {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
