//! Session repository trait definition.

use chrono::{DateTime, Utc};
use parley_types::error::RepositoryError;
use parley_types::identity::{IdentityId, IdentitySummary};
use parley_types::session::Session;

/// Repository trait for session persistence.
///
/// Sessions are keyed by the digest of their token; raw tokens never reach
/// storage.
pub trait SessionRepository: Send + Sync {
    /// Insert a new session. Fails with `Conflict` if the digest already exists.
    fn insert(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Look up a session and join its owning identity.
    fn find_with_identity(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<
        Output = Result<Option<(Session, IdentitySummary)>, RepositoryError>,
    > + Send;

    /// Delete a session. Returns whether a row was removed.
    fn delete(
        &self,
        token_hash: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete every session of an identity. Returns the count removed.
    fn delete_for_identity(
        &self,
        identity_id: &IdentityId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete sessions with `expires_at <= now`. Returns the count removed.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
