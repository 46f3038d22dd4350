//! Password hashing utilities

use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

use crate::domain::{DomainError, DomainResult};

/// Hash a password using bcrypt at the given work factor
pub fn hash_password(password: &str, cost: u32) -> DomainResult<String> {
    hash(password, cost)
        .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash.
///
/// A hash that bcrypt cannot parse counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    verify(password, stored_hash).unwrap_or(false)
}
