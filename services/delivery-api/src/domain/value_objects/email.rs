//! Email value object

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validated, lower-cased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl Into<String>) -> Result<Self, EmailError> {
        let email = email.into();
        let trimmed = email.trim();

        if EmailAddress::from_str(trimmed).is_err() {
            return Err(EmailError::InvalidFormat(email));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn domain(&self) -> Option<&str> {
        self.0.split('@').nth(1)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        let email = Email::new("sindico@condominio.com.br");
        assert!(email.is_ok());
        assert_eq!(email.unwrap().as_str(), "sindico@condominio.com.br");
    }

    #[test]
    fn test_email_lowercased() {
        let email = Email::new("Maria.Silva@Example.COM").unwrap();
        assert_eq!(email.as_str(), "maria.silva@example.com");
    }

    #[test]
    fn test_email_trimmed() {
        let email = Email::new("  ana@example.com  ").unwrap();
        assert_eq!(email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_invalid_email_no_at() {
        assert!(Email::new("not-an-email").is_err());
    }

    #[test]
    fn test_invalid_email_empty() {
        assert!(Email::new("").is_err());
    }

    #[test]
    fn test_email_domain() {
        let email = Email::new("joao@obra.app.br").unwrap();
        assert_eq!(email.domain(), Some("obra.app.br"));
    }

    #[test]
    fn test_email_equality_ignores_case() {
        let a = Email::new("a@b.com").unwrap();
        let b = Email::new("A@B.COM").unwrap();
        assert_eq!(a, b);
    }
}
