//! Argon2 password hashing

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use obra_errors::{AppError, AppResult};

use crate::domain::value_objects::{HashedPassword, Password};

/// Hash a plaintext password with a fresh salt
pub fn hash_password(password: &Password) -> AppResult<HashedPassword> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    Ok(HashedPassword::from_hash(hash.to_string()))
}

/// Verify a login attempt against a stored hash
pub fn verify_password(candidate: &str, hash: &HashedPassword) -> bool {
    let Ok(parsed) = PasswordHash::new(hash.as_str()) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("senha-forte-1").unwrap();
        let hash = hash_password(&password).unwrap();
        assert!(verify_password("senha-forte-1", &hash));
        assert!(!verify_password("senha-errada-2", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = Password::new("senha-forte-1").unwrap();
        let a = hash_password(&password).unwrap();
        let b = hash_password(&password).unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_garbage_hash_fails_closed() {
        let hash = HashedPassword::from_hash("not-a-phc-string");
        assert!(!verify_password("whatever1", &hash));
    }
}
