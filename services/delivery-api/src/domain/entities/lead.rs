//! Lead entity (a marketing contact captured from the public site)

use chrono::{DateTime, Utc};
use obra_common::LeadId;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Email;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub company_name: String,
    pub contact_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub source: Option<String>,
    pub converted: bool,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn new(company_name: String, contact_name: String, email: Email) -> Self {
        Self {
            id: LeadId::new(),
            company_name,
            contact_name,
            email,
            phone: None,
            message: None,
            source: None,
            converted: false,
            created_at: Utc::now(),
        }
    }

    pub fn mark_converted(&mut self) {
        self.converted = true;
    }
}
