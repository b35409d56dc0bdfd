//! User entity

use chrono::{DateTime, Utc};
use obra_auth_core::Role;
use obra_common::{AuditInfo, TenantId, UserId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// None only for MASTER users, who operate across tenants
    pub tenant_id: Option<TenantId>,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub display_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub audit_info: AuditInfo,
}

impl User {
    pub fn new(
        tenant_id: Option<TenantId>,
        email: Email,
        password_hash: HashedPassword,
        display_name: String,
        role: Role,
    ) -> Self {
        Self {
            id: UserId::new(),
            tenant_id,
            email,
            password_hash,
            display_name,
            role,
            status: UserStatus::Active,
            last_login_at: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn deactivate(&mut self) {
        self.status = UserStatus::Inactive;
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    pub fn update_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for User {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
