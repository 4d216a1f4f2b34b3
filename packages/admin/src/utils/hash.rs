use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Tunable cost of the password hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Argon2 iterations (`t_cost`).
    pub work_factor: u32,
    /// Argon2 memory in KiB (`m_cost`).
    pub memory_kib: u32,
}

/// Build an Argon2id hasher for the given cost.
pub fn hasher(cost: HashCost) -> Result<Argon2<'static>, argon2::Error> {
    let params = Params::new(cost.memory_kib, cost.work_factor, 1, None)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password with a fresh random salt, returning a PHC string.
pub fn hash_password(argon: &Argon2<'_>, password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check a password against a stored PHC string.
///
/// The cost parameters are read from the stored hash, so hashes created with
/// an older cost keep verifying. Returns `Ok(false)` on mismatch and an error
/// when the stored value is not a usable Argon2 hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Prefixes of bcrypt hashes written by the earlier admin tooling.
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

pub fn is_bcrypt(stored: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|prefix| stored.starts_with(prefix))
}

/// Check a password against a legacy bcrypt hash.
pub fn verify_bcrypt(password: &str, stored: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, stored)
}
