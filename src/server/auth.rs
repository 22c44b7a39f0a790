//! Admin credentials.
//!
//! An admin request carries a token either as `Authorization: Bearer <token>`
//! or inside a `session` cookie whose value is base64url JSON of the form
//! `{"access_token": "<token>"}`.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

#[derive(Serialize, Deserialize)]
struct SessionCookie {
    access_token: String,
}

#[derive(Debug, PartialEq)]
pub enum Credentials {
    Missing,
    /// A credential was sent but could not be read.
    Malformed,
    Token(String),
}

/// Extracts the admin token from a request. A bearer token wins over a cookie.
pub fn credentials(headers: &HeaderMap) -> Credentials {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        return match token {
            Some(token) => Credentials::Token(token.to_string()),
            None => Credentials::Malformed,
        };
    }

    let cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE);

    match cookie {
        Some((_, value)) => decode_session(value)
            .map(Credentials::Token)
            .unwrap_or(Credentials::Malformed),
        None => Credentials::Missing,
    }
}

/// Reads the access token out of a `session` cookie value.
pub fn decode_session(value: &str) -> Option<String> {
    let value = urlencoding::decode(value).ok()?;
    let bytes = URL_SAFE_NO_PAD.decode(value.trim_end_matches('=')).ok()?;
    let session: SessionCookie = serde_json::from_slice(&bytes).ok()?;
    Some(session.access_token).filter(|token| !token.is_empty())
}

/// Builds a `session` cookie value for `token`.
pub fn encode_session(token: &str) -> String {
    let json = serde_json::json!({ "access_token": token }).to_string();
    URL_SAFE_NO_PAD.encode(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        let h = headers(header::AUTHORIZATION, "Bearer abc123");
        assert_eq!(credentials(&h), Credentials::Token("abc123".to_string()));
    }

    #[test]
    fn test_non_bearer_scheme_is_malformed() {
        let h = headers(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert_eq!(credentials(&h), Credentials::Malformed);
    }

    #[test]
    fn test_session_cookie() {
        let cookie = format!("theme=dark; session={}; other=1", encode_session("tok"));
        let h = headers(header::COOKIE, &cookie);
        assert_eq!(credentials(&h), Credentials::Token("tok".to_string()));
    }

    #[test]
    fn test_padded_session_cookie() {
        // {"access_token":"x"} encodes with padding
        let padded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"access_token":"x"}"#);
        assert_eq!(decode_session(&padded).as_deref(), Some("x"));
    }

    #[test]
    fn test_garbage_cookie_is_malformed() {
        let h = headers(header::COOKIE, "session=not-base64!!");
        assert_eq!(credentials(&h), Credentials::Malformed);
    }

    #[test]
    fn test_no_credentials() {
        assert_eq!(credentials(&HeaderMap::new()), Credentials::Missing);
        let h = headers(header::COOKIE, "theme=dark");
        assert_eq!(credentials(&h), Credentials::Missing);
    }
}
