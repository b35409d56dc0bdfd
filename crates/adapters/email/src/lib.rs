//! obra-adapter-email - SMTP dispatch
//!
//! Covers transactional mail for the platform:
//! - password reset links
//! - owner invitations when a unit is handed over

mod client;
mod template;

pub use client::{EmailClient, EmailMessage};
pub use template::EmailTemplate;

pub use obra_config::EmailConfig;

use obra_errors::AppResult;

/// Email dispatch interface
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// Plain-text mail
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;

    /// HTML mail with optional plain-text alternative
    async fn send_html_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: Option<&str>,
    ) -> AppResult<()>;

    /// Template-rendered mail
    async fn send_template_email(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        context: &serde_json::Value,
    ) -> AppResult<()>;
}
