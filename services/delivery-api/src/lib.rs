//! delivery-api - tenants, projects, units, owners, documents and warranty
//! tracking for construction-delivery workflows

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
