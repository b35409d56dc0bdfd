//! Warranty aggregate: tenant-defined categories and per-unit warranty rows

use chrono::NaiveDate;
use obra_common::{AuditInfo, TenantId, UnitId, UnitWarrantyId, WarrantyCategoryId};
use obra_domain_core::{AggregateRoot, Entity};
use serde::{Deserialize, Serialize};

/// Warranty category, e.g. "Estrutura" with a 5-year term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarrantyCategory {
    pub id: WarrantyCategoryId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub term_years: i32,
    pub term_months: i32,
    pub audit_info: AuditInfo,
}

impl WarrantyCategory {
    pub fn new(tenant_id: TenantId, name: String, term_years: i32, term_months: i32) -> Self {
        Self {
            id: WarrantyCategoryId::new(),
            tenant_id,
            name,
            description: None,
            term_years,
            term_months,
            audit_info: AuditInfo::default(),
        }
    }

    /// Full term in calendar months
    pub fn term_in_months(&self) -> u32 {
        (self.term_years.max(0) as u32) * 12 + self.term_months.max(0) as u32
    }
}

impl Entity for WarrantyCategory {
    type Id = WarrantyCategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for WarrantyCategory {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

/// Derived display status of a warranty. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarrantyStatus {
    Vigente,
    Expirada,
    Suspensa,
}

impl WarrantyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vigente => "VIGENTE",
            Self::Expirada => "EXPIRADA",
            Self::Suspensa => "SUSPENSA",
        }
    }
}

/// A warranty row attached to a unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitWarranty {
    pub id: UnitWarrantyId,
    pub unit_id: UnitId,
    pub category_id: WarrantyCategoryId,
    pub start_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub suspended: bool,
    pub suspended_reason: Option<String>,
    pub audit_info: AuditInfo,
}

impl UnitWarranty {
    pub fn new(
        unit_id: UnitId,
        category_id: WarrantyCategoryId,
        start_date: NaiveDate,
        expiration_date: NaiveDate,
    ) -> Self {
        Self {
            id: UnitWarrantyId::new(),
            unit_id,
            category_id,
            start_date,
            expiration_date,
            suspended: false,
            suspended_reason: None,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn suspend(&mut self, reason: Option<String>) {
        self.suspended = true;
        self.suspended_reason = reason;
    }

    pub fn reactivate(&mut self) {
        self.suspended = false;
        self.suspended_reason = None;
    }
}

impl Entity for UnitWarranty {
    type Id = UnitWarrantyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for UnitWarranty {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_in_months() {
        let cat = WarrantyCategory::new(TenantId::new(), "Estrutura".to_string(), 5, 0);
        assert_eq!(cat.term_in_months(), 60);

        let cat = WarrantyCategory::new(TenantId::new(), "Impermeabilização".to_string(), 1, 6);
        assert_eq!(cat.term_in_months(), 18);
    }

    #[test]
    fn test_suspend_and_reactivate() {
        let mut warranty = UnitWarranty::new(
            UnitId::new(),
            WarrantyCategoryId::new(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        );
        warranty.suspend(Some("Reforma não autorizada".to_string()));
        assert!(warranty.suspended);
        assert!(warranty.suspended_reason.is_some());

        warranty.reactivate();
        assert!(!warranty.suspended);
        assert!(warranty.suspended_reason.is_none());
    }
}
