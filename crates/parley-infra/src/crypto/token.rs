//! Session token generation.
//!
//! Tokens are 32 bytes from the OS RNG, hex-encoded. Only their SHA-256
//! digest is stored, so a leaked sessions table cannot be replayed.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use parley_core::service::hash::TokenGenerator;
use parley_types::session::SessionToken;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// OS-random bearer tokens with SHA-256 storage digests.
#[derive(Debug, Clone, Default)]
pub struct RandomTokenGenerator;

impl RandomTokenGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> SessionToken {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        SessionToken::new(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    fn digest(&self, token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}
