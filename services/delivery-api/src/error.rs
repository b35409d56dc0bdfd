//! Service error definitions

use crate::domain::value_objects::{EmailError, PasswordError};
use obra_errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("User is inactive")]
    UserInactive,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Password too weak")]
    PasswordTooWeak,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::unauthorized("Invalid credentials"),
            AuthError::UserNotFound => AppError::not_found("User not found"),
            AuthError::UserAlreadyExists => AppError::conflict("User already exists"),
            AuthError::UserInactive => AppError::forbidden("User is inactive"),
            AuthError::InvalidResetToken => {
                AppError::unauthorized("Invalid or expired reset token")
            }
            AuthError::PasswordTooWeak => AppError::validation("Password too weak"),
        }
    }
}

impl From<EmailError> for AppError {
    fn from(error: EmailError) -> Self {
        AppError::validation(error.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(error: PasswordError) -> Self {
        AppError::validation(error.to_string())
    }
}
