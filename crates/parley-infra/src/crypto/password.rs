//! Argon2id password hashing.
//!
//! Implements the `PasswordHasher` port from `parley-core`. Hashes are PHC
//! strings (`$argon2id$v=19$...`) carrying their own salt and parameters, so
//! parameters can be raised later without invalidating stored hashes.
//! Hashing is CPU-bound and runs on the blocking thread pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use parley_core::service::hash::PasswordHasher;
use parley_types::error::CredentialError;
use tracing::warn;

/// Fixed salt used only for the decoy verification on unknown emails.
const DECOY_SALT: &[u8] = b"parley-decoy-salt";

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CredentialError::Hashing)
}

fn verify_blocking(password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| CredentialError::Hashing)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(CredentialError::Hashing),
    }
}

fn burn_blocking(password: &str) {
    if let Ok(salt) = SaltString::encode_b64(DECOY_SALT) {
        let _ = Argon2::default().hash_password(password.as_bytes(), &salt);
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|_| CredentialError::Hashing)?
    }

    async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &stored_hash))
            .await
            .map_err(|_| CredentialError::Hashing)?
    }

    async fn burn(&self, password: &str) {
        let password = password.to_owned();
        if tokio::task::spawn_blocking(move || burn_blocking(&password))
            .await
            .is_err()
        {
            warn!("Decoy password hash task failed");
        }
    }
}
