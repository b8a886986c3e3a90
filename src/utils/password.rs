use bcrypt::{hash, verify, DEFAULT_COST};

use crate::errors::AppError;

/// bcrypt hash with a fresh random salt embedded in the result.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            false
        }
    }
}
