//! Password value objects
//!
//! `Password` is a validated plaintext candidate that only lives during a
//! request; `HashedPassword` is what gets persisted.

use serde::{Deserialize, Serialize};

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;

/// Plaintext password candidate. Never serialized, never logged.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Result<Self, PasswordError> {
        let password = password.into();

        if password.len() < MIN_LENGTH {
            return Err(PasswordError::TooShort(MIN_LENGTH));
        }
        if password.len() > MAX_LENGTH {
            return Err(PasswordError::TooLong(MAX_LENGTH));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordError::MissingDigit);
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(PasswordError::MissingLetter);
        }

        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Password(***)")
    }
}

/// Argon2 hash of a password
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must be at most {0} characters")]
    TooLong(usize),

    #[error("Password must contain at least one digit")]
    MissingDigit,

    #[error("Password must contain at least one letter")]
    MissingLetter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(Password::new("correcthorse1").is_ok());
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            Password::new("ab1"),
            Err(PasswordError::TooShort(_))
        ));
    }

    #[test]
    fn test_missing_digit() {
        assert!(matches!(
            Password::new("onlyletters"),
            Err(PasswordError::MissingDigit)
        ));
    }

    #[test]
    fn test_missing_letter() {
        assert!(matches!(
            Password::new("123456789"),
            Err(PasswordError::MissingLetter)
        ));
    }

    #[test]
    fn test_debug_redacts() {
        let p = Password::new("segredo123").unwrap();
        assert_eq!(format!("{:?}", p), "Password(***)");
    }
}
