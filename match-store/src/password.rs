//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the parameters travel with each hash.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params};
use uuid::Uuid;

use crate::StoreError;

/// Largest memory cost (KiB) a stored hash may ask `verify_password` for.
pub const MAX_MEMORY_COST: u32 = 64 * 1024;

/// Largest number of passes a stored hash may ask `verify_password` for.
pub const MAX_TIME_COST: u32 = 10;

/// Hash `password` with a fresh random salt and the default Argon2id
/// parameters.
///
/// # Errors
/// Returns [`StoreError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| StoreError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string.
///
/// Malformed hashes, other algorithms, and hashes whose cost exceeds
/// [`MAX_MEMORY_COST`] or [`MAX_TIME_COST`] never match.
#[must_use]
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encoded) else {
        return false;
    };
    if parsed.algorithm != Algorithm::Argon2id.ident() {
        return false;
    }
    let Ok(params) = Params::try_from(&parsed) else {
        return false;
    };
    if params.m_cost() > MAX_MEMORY_COST || params.t_cost() > MAX_TIME_COST {
        return false;
    }
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
