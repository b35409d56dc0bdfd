//! Warranty repository ports
//!
//! `regenerate` is the transactional bulk operation: for each target unit the
//! existing warranty rows are deleted and the freshly computed set inserted,
//! all in one transaction.

use async_trait::async_trait;
use obra_common::{TenantId, UnitId, UnitWarrantyId, WarrantyCategoryId};
use obra_errors::AppResult;

use crate::domain::entities::{UnitWarranty, WarrantyCategory};

#[async_trait]
pub trait WarrantyCategoryRepository: Send + Sync {
    async fn create(&self, category: &WarrantyCategory) -> AppResult<()>;
    async fn update(&self, category: &WarrantyCategory) -> AppResult<()>;
    async fn delete(&self, id: &WarrantyCategoryId) -> AppResult<()>;
    async fn find_by_id(&self, id: &WarrantyCategoryId) -> AppResult<Option<WarrantyCategory>>;
    async fn find_by_ids(&self, ids: &[WarrantyCategoryId]) -> AppResult<Vec<WarrantyCategory>>;
    async fn list_by_tenant(&self, tenant_id: &TenantId) -> AppResult<Vec<WarrantyCategory>>;
}

#[async_trait]
pub trait UnitWarrantyRepository: Send + Sync {
    /// Replace all warranty rows of the given units with `rows`, atomically.
    /// An empty `rows` set simply clears the units' warranties.
    async fn regenerate(&self, unit_ids: &[UnitId], rows: &[UnitWarranty]) -> AppResult<()>;

    async fn find_by_id(&self, id: &UnitWarrantyId) -> AppResult<Option<UnitWarranty>>;
    async fn list_by_unit(&self, unit_id: &UnitId) -> AppResult<Vec<UnitWarranty>>;

    async fn set_suspended(
        &self,
        id: &UnitWarrantyId,
        suspended: bool,
        reason: Option<&str>,
    ) -> AppResult<()>;
}
