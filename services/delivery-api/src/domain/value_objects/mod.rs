//! Value objects

mod email;
mod password;

pub use email::{Email, EmailError};
pub use password::{HashedPassword, Password, PasswordError};
