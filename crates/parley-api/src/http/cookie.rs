//! Session cookie handling.
//!
//! The cookie carries the raw session token; attributes are `HttpOnly`,
//! `SameSite=Lax`, `Path=/`, and `Secure` when configured.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

/// Value of cookie `name` across all `Cookie` headers, if present and non-empty.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("parley_session", "abc", 86400, false);
        assert_eq!(
            cookie,
            "parley_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=86400"
        );
        assert!(session_cookie("s", "abc", 10, true).ends_with("; Secure"));
        assert!(clear_cookie("s", false).contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; parley_session=tok123; lang=en"),
        );
        assert_eq!(
            read_cookie(&headers, "parley_session").as_deref(),
            Some("tok123")
        );
        assert!(read_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn test_read_cookie_across_headers_and_empty_value() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("parley_session=tok"));
        assert_eq!(read_cookie(&headers, "parley_session").as_deref(), Some("tok"));

        let mut empty = HeaderMap::new();
        empty.insert(COOKIE, HeaderValue::from_static("parley_session="));
        assert!(read_cookie(&empty, "parley_session").is_none());
    }
}
