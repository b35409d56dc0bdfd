//! Billing history entry for a tenant subscription

use chrono::{DateTime, Utc};
use obra_common::{BillingEntryId, TenantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingEntry {
    pub id: BillingEntryId,
    pub tenant_id: TenantId,
    pub description: String,
    pub amount_cents: i64,
    pub currency: String,
    /// First day of the month this entry refers to, e.g. 2026-08-01
    pub reference_month: chrono::NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BillingEntry {
    pub fn new(
        tenant_id: TenantId,
        description: String,
        amount_cents: i64,
        reference_month: chrono::NaiveDate,
    ) -> Self {
        Self {
            id: BillingEntryId::new(),
            tenant_id,
            description,
            amount_cents,
            currency: "BRL".to_string(),
            reference_month,
            paid_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_paid(&mut self) {
        self.paid_at = Some(Utc::now());
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }
}
