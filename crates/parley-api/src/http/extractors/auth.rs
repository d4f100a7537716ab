//! Session authentication extractors.
//!
//! The session token is read from:
//! - `Authorization: Bearer <token>` header
//! - the session cookie (`auth.cookie_name`, default `parley_session`)
//!
//! The header wins when both are present. Tokens are validated through the
//! `SessionManager`; an unknown, revoked, or expired token is rejected with
//! 401 even on routes where authentication is optional.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;
use parley_types::identity::IdentitySummary;

use crate::http::cookie::read_cookie;
use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Extracting this requires a valid session.
pub struct CurrentIdentity {
    pub identity: IdentitySummary,
    /// Raw token of the request, needed to revoke this session on logout.
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts, &state.config.auth.cookie_name)?.ok_or_else(|| {
            AppError::Unauthorized(
                "Missing session token. Log in, then send it via 'Authorization: Bearer <token>' or the session cookie.".to_string(),
            )
        })?;

        let identity = state.sessions.validate(&token).await?;
        Ok(Self { identity, token })
    }
}

/// Caller that may be anonymous. A presented token must still be valid.
pub struct OptionalIdentity(pub Option<IdentitySummary>);

impl FromRequestParts<AppState> for OptionalIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match extract_token(parts, &state.config.auth.cookie_name)? {
            Some(token) => Ok(Self(Some(state.sessions.validate(&token).await?))),
            None => Ok(Self(None)),
        }
    }
}

/// Pull the session token out of the request, if one was sent.
pub fn extract_token(parts: &Parts, cookie_name: &str) -> Result<Option<String>, AppError> {
    if let Some(auth) = parts.headers.get(AUTHORIZATION) {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string())
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("Empty bearer token".to_string()));
        }
        return Ok(Some(token.to_string()));
    }

    Ok(read_cookie(&parts.headers, cookie_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/me");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_header() {
        let p = parts(&[("authorization", "Bearer abc123")]);
        assert_eq!(
            extract_token(&p, "parley_session").unwrap().as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_cookie_fallback() {
        let p = parts(&[("cookie", "parley_session=fromcookie")]);
        assert_eq!(
            extract_token(&p, "parley_session").unwrap().as_deref(),
            Some("fromcookie")
        );
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let p = parts(&[
            ("authorization", "Bearer fromheader"),
            ("cookie", "parley_session=fromcookie"),
        ]);
        assert_eq!(
            extract_token(&p, "parley_session").unwrap().as_deref(),
            Some("fromheader")
        );
    }

    #[test]
    fn test_no_token_is_anonymous() {
        let p = parts(&[]);
        assert!(extract_token(&p, "parley_session").unwrap().is_none());
    }

    #[test]
    fn test_malformed_authorization_rejected() {
        for value in ["Basic dXNlcjpwdw==", "Bearer   "] {
            let p = parts(&[("authorization", value)]);
            assert!(matches!(
                extract_token(&p, "parley_session").unwrap_err(),
                AppError::Unauthorized(_)
            ));
        }
    }
}
