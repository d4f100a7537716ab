//! Hashing abstractions for credentials and session tokens.
//!
//! Defined in parley-core so services can hash secrets without coupling to a
//! specific algorithm. The argon2 and SHA-256 adapters live in parley-infra.

use parley_types::error::CredentialError;
use parley_types::session::SessionToken;

/// One-way password hashing with a per-record salt.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into a self-describing string (algorithm, params, salt).
    fn hash(
        &self,
        password: &str,
    ) -> impl std::future::Future<Output = Result<String, CredentialError>> + Send;

    /// Check a password against a stored hash in constant time.
    ///
    /// Returns `Ok(false)` on mismatch; errors only on malformed hashes.
    fn verify(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, CredentialError>> + Send;

    /// Spend the same work as `verify` without a stored hash.
    ///
    /// Called when no identity matches the email so response time does not
    /// reveal whether an account exists.
    fn burn(&self, password: &str) -> impl std::future::Future<Output = ()> + Send;
}

/// Source of session tokens and their storage digests.
pub trait TokenGenerator: Send + Sync {
    /// Generate a fresh token with at least 256 bits of entropy.
    fn generate(&self) -> SessionToken;

    /// Digest under which a token is stored and looked up.
    fn digest(&self, token: &str) -> String;
}
