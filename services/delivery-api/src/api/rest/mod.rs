//! REST handlers

pub mod audit_logs;
pub mod auth;
pub mod billing;
pub mod documents;
pub mod health;
pub mod leads;
pub mod owners;
pub mod projects;
pub mod tenants;
pub mod units;
pub mod warranties;

use obra_common::Pagination;
use obra_errors::{AppError, AppResult};
use serde::Deserialize;
use uuid::Uuid;

/// Path-segment UUIDs are part of the resource address; a malformed one is a
/// client error, unlike query filters which degrade to empty results.
pub(crate) fn path_uuid(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation(format!("Invalid {} ID", what)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page.unwrap_or(1), self.page_size.unwrap_or(20))
    }
}
