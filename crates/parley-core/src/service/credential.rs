//! Credential store: registration, login verification, and plan upgrades.
//!
//! Passwords are only ever handled as input to the injected hasher; neither
//! the plaintext nor the hash is logged.

use chrono::Utc;
use parley_types::error::{CredentialError, RepositoryError};
use parley_types::identity::{Identity, IdentityId, Plan, RegisterRequest, normalize_email};
use tracing::{debug, info};

use crate::repository::identity::IdentityRepository;
use crate::service::hash::PasswordHasher;

/// Verifies login attempts against stored identity records.
///
/// Generic over the repository and hasher so it can run against an
/// in-memory fake as well as SQLite.
pub struct CredentialStore<R: IdentityRepository, H: PasswordHasher> {
    identity_repo: R,
    hasher: H,
}

impl<R: IdentityRepository, H: PasswordHasher> CredentialStore<R, H> {
    pub fn new(identity_repo: R, hasher: H) -> Self {
        Self {
            identity_repo,
            hasher,
        }
    }

    /// Register a new identity on the basic plan.
    ///
    /// Fails with `Validation` if any field is empty and with `EmailTaken`
    /// if the (normalized) email already exists.
    pub async fn register(&self, request: RegisterRequest) -> Result<IdentityId, CredentialError> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        if name.is_empty() {
            return Err(CredentialError::Validation("name cannot be empty".to_string()));
        }
        if email.is_empty() {
            return Err(CredentialError::Validation("email cannot be empty".to_string()));
        }
        if request.password.is_empty() {
            return Err(CredentialError::Validation(
                "password cannot be empty".to_string(),
            ));
        }

        if self.identity_repo.get_by_email(&email).await?.is_some() {
            return Err(CredentialError::EmailTaken(email));
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let identity = Identity {
            id: IdentityId::new(),
            display_name: name.to_string(),
            email: email.clone(),
            password_hash,
            plan: Plan::Basic,
            created_at: Utc::now(),
        };

        // A concurrent registration can still win the race past the lookup
        // above; the unique index catches it.
        self.identity_repo
            .create(&identity)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CredentialError::EmailTaken(email),
                other => CredentialError::Storage(other),
            })?;

        info!(identity_id = %identity.id, "Identity registered");
        Ok(identity.id)
    }

    /// Verify an email/password pair.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`, and
    /// both spend one hash verification.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(CredentialError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let Some(identity) = self.identity_repo.get_by_email(&email).await? else {
            self.hasher.burn(password).await;
            debug!("Login attempt for unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        if self.hasher.verify(password, &identity.password_hash).await? {
            Ok(identity)
        } else {
            debug!(identity_id = %identity.id, "Login attempt with wrong password");
            Err(CredentialError::InvalidCredentials)
        }
    }

    /// Move an identity to the premium plan. Idempotent.
    pub async fn upgrade(&self, id: &IdentityId) -> Result<Plan, CredentialError> {
        let identity = self
            .identity_repo
            .get_by_id(id)
            .await?
            .ok_or(CredentialError::NotFound)?;

        if identity.plan == Plan::Premium {
            return Ok(Plan::Premium);
        }

        self.identity_repo
            .update_plan(id, Plan::Premium)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CredentialError::NotFound,
                other => CredentialError::Storage(other),
            })?;

        info!(identity_id = %id, "Identity upgraded to premium");
        Ok(Plan::Premium)
    }

    /// Get an identity by ID.
    pub async fn get(&self, id: &IdentityId) -> Result<Identity, CredentialError> {
        self.identity_repo
            .get_by_id(id)
            .await?
            .ok_or(CredentialError::NotFound)
    }
}
