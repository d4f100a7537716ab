//! Identity repository trait definition.

use parley_types::error::RepositoryError;
use parley_types::identity::{Identity, IdentityId, Plan};

/// Repository trait for identity persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteIdentityRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait IdentityRepository: Send + Sync {
    /// Insert a new identity. Fails with `Conflict` if the email is taken.
    fn create(
        &self,
        identity: &Identity,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get an identity by its unique ID.
    fn get_by_id(
        &self,
        id: &IdentityId,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, RepositoryError>> + Send;

    /// Get an identity by its normalized email.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Identity>, RepositoryError>> + Send;

    /// Set the plan of an identity. Fails with `NotFound` if absent.
    fn update_plan(
        &self,
        id: &IdentityId,
        plan: Plan,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
