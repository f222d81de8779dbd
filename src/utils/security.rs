//! Security Utilities
//!
//! Password hashing, OTP generation, and random token helpers.

use bcrypt::{hash, verify, DEFAULT_COST};
use rand::{distributions::Alphanumeric, Rng};

/// Default bcrypt cost for password hashing
pub const DEFAULT_BCRYPT_COST: u32 = DEFAULT_COST;

/// Generate a random alphanumeric string (slug suffixes, refresh payloads)
pub fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a 6-digit OTP code
pub fn generate_otp_code() -> i32 {
    rand::thread_rng().gen_range(100000..=999999)
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_BCRYPT_COST)
}

/// Verify a password against its bcrypt hash
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hashed)
}
