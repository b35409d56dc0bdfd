//! Authenticated actor and tenant-scoping checks

use obra_auth_core::{Claims, Role};
use obra_common::{TenantId, UserId};
use obra_errors::{AppError, AppResult};

use crate::domain::entities::AuditLog;
use crate::domain::repositories::AuditLogRepository;

/// The authenticated principal behind a command or query
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: UserId,
    pub tenant_id: Option<TenantId>,
    pub role: Role,
}

impl Actor {
    pub fn from_claims(claims: &Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            tenant_id: claims.tenant_id()?,
            role: claims.role,
        })
    }

    /// Tenant this actor is scoped to; MASTER actors have none
    pub fn require_tenant(&self) -> AppResult<TenantId> {
        self.tenant_id
            .ok_or_else(|| AppError::forbidden("Operation requires a tenant-scoped account"))
    }

    /// MASTER passes any scope; everyone else must match the target tenant
    pub fn ensure_tenant_scope(&self, tenant_id: &TenantId) -> AppResult<()> {
        if self.role == Role::Master {
            return Ok(());
        }
        match self.tenant_id {
            Some(own) if own == *tenant_id => Ok(()),
            _ => Err(AppError::forbidden("Resource belongs to another tenant")),
        }
    }

    /// MASTER, or ADMIN of the target tenant
    pub fn ensure_admin_scope(&self, tenant_id: &TenantId) -> AppResult<()> {
        match self.role {
            Role::Master => Ok(()),
            Role::Admin => self.ensure_tenant_scope(tenant_id),
            Role::Owner => Err(AppError::forbidden("Requires role: ADMIN")),
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }
}

/// Append an audit entry for an already-committed write. A failed append must
/// not undo the write, so it only logs.
pub(crate) async fn record_audit(repo: &dyn AuditLogRepository, entry: AuditLog) {
    if let Err(e) = repo.append(&entry).await {
        tracing::warn!(
            action = %entry.action,
            entity_type = %entry.entity_type,
            error = %e,
            "Failed to append audit log"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(tenant_id: TenantId) -> Actor {
        Actor {
            user_id: UserId::new(),
            tenant_id: Some(tenant_id),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_master_passes_any_scope() {
        let actor = Actor {
            user_id: UserId::new(),
            tenant_id: None,
            role: Role::Master,
        };
        assert!(actor.ensure_tenant_scope(&TenantId::new()).is_ok());
        assert!(actor.ensure_admin_scope(&TenantId::new()).is_ok());
    }

    #[test]
    fn test_admin_limited_to_own_tenant() {
        let tenant_id = TenantId::new();
        let actor = admin(tenant_id);
        assert!(actor.ensure_tenant_scope(&tenant_id).is_ok());
        assert!(actor.ensure_tenant_scope(&TenantId::new()).is_err());
    }

    #[test]
    fn test_owner_never_admin() {
        let tenant_id = TenantId::new();
        let actor = Actor {
            user_id: UserId::new(),
            tenant_id: Some(tenant_id),
            role: Role::Owner,
        };
        assert!(actor.ensure_admin_scope(&tenant_id).is_err());
        assert!(actor.ensure_tenant_scope(&tenant_id).is_ok());
    }
}
