//! Session manager: issue, validate, and revoke session tokens.
//!
//! Per-token lifecycle: `Issued -> Valid -> {Expired | Revoked}`. Expiry is
//! lazy: a session is valid iff its record exists and `expires_at > now`,
//! evaluated on every call. Validation never extends `expires_at`.

use chrono::Duration;
use parley_types::error::{RepositoryError, SessionError};
use parley_types::identity::{IdentityId, IdentitySummary};
use parley_types::session::{IssuedSession, Session};
use tracing::{debug, info, warn};

use crate::repository::session::SessionRepository;
use crate::service::clock::Clock;
use crate::service::hash::TokenGenerator;

/// Attempts at drawing a non-colliding token before giving up.
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Issues and checks session tokens with a fixed time-to-live.
pub struct SessionManager<S: SessionRepository, T: TokenGenerator, C: Clock> {
    session_repo: S,
    tokens: T,
    clock: C,
    ttl: Duration,
}

impl<S: SessionRepository, T: TokenGenerator, C: Clock> SessionManager<S, T, C> {
    /// Create a session manager. `ttl` is the fixed lifetime of every session.
    pub fn new(session_repo: S, tokens: T, clock: C, ttl: Duration) -> Self {
        Self {
            session_repo,
            tokens,
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new session for an identity.
    ///
    /// Multiple concurrent sessions per identity are allowed.
    pub async fn issue(&self, identity_id: &IdentityId) -> Result<IssuedSession, SessionError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = self.tokens.generate();
            let issued_at = self.clock.now();
            let expires_at = issued_at
                .checked_add_signed(self.ttl)
                .ok_or(SessionError::ExpiryOutOfRange)?;
            let session = Session {
                token_hash: self.tokens.digest(token.expose()),
                identity_id: *identity_id,
                issued_at,
                expires_at,
            };

            match self.session_repo.insert(&session).await {
                Ok(()) => {
                    info!(identity_id = %identity_id, expires_at = %session.expires_at, "Session issued");
                    return Ok(IssuedSession {
                        token,
                        identity_id: *identity_id,
                        expires_at: session.expires_at,
                    });
                }
                Err(RepositoryError::Conflict(_)) => {
                    warn!(attempt, "Session token collision, drawing a new token");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(SessionError::Storage(RepositoryError::Conflict(
            "could not generate a unique session token".to_string(),
        )))
    }

    /// Resolve a token to its identity.
    ///
    /// Fails with `InvalidSession` if the token is unknown or
    /// `expires_at <= now`. Has no side effects.
    pub async fn validate(&self, token: &str) -> Result<IdentitySummary, SessionError> {
        if token.is_empty() {
            return Err(SessionError::InvalidSession);
        }

        let token_hash = self.tokens.digest(token);
        let Some((session, identity)) = self.session_repo.find_with_identity(&token_hash).await?
        else {
            return Err(SessionError::InvalidSession);
        };

        if session.is_valid_at(self.clock.now()) {
            Ok(identity)
        } else {
            debug!(identity_id = %identity.id, "Rejected expired session");
            Err(SessionError::InvalidSession)
        }
    }

    /// Delete a session. Revoking an unknown or already revoked token is not an error.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        if token.is_empty() {
            return Ok(());
        }
        let removed = self.session_repo.delete(&self.tokens.digest(token)).await?;
        if removed {
            info!("Session revoked");
        }
        Ok(())
    }

    /// Delete every session of an identity (logout from all devices).
    pub async fn revoke_all(&self, identity_id: &IdentityId) -> Result<u64, SessionError> {
        let removed = self.session_repo.delete_for_identity(identity_id).await?;
        info!(identity_id = %identity_id, removed, "All sessions revoked");
        Ok(removed)
    }

    /// Remove expired session records. Storage hygiene only; validity does
    /// not depend on it.
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let removed = self.session_repo.delete_expired(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }
}
