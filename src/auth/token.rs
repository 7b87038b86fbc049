//! Token validity checks.
//!
//! The backend issues JWT access tokens. The client never verifies
//! signatures - that is the server's job - but it does decode the payload
//! to decide whether a stored token is still worth presenting: non-empty,
//! structurally well-formed, and not past its `exp` claim.
//!
//! These checks are pure and cheap; the session guard runs them on every
//! regained-focus event.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// How close to expiry a token counts as "expiring soon" (minutes).
/// Matches the refresh window the web client uses before re-login prompts.
const TOKEN_EXPIRY_BUFFER_MINUTES: i64 = 5;

#[derive(Debug, Deserialize)]
struct Claims {
    /// Standard JWT expiry, Unix seconds. Absent means non-expiring.
    exp: Option<i64>,
}

/// Decode the claims segment of a JWT without verifying the signature.
fn decode_claims(token: &str) -> Option<Claims> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Check whether a stored token is usable at the given instant.
///
/// Returns false for absent, empty, or whitespace tokens, for tokens that
/// do not decode as a JWT, and for tokens whose `exp` claim is at or
/// before `now`.
pub fn is_valid_token_at(token: Option<&str>, now: DateTime<Utc>) -> bool {
    let token = match token {
        Some(t) if !t.trim().is_empty() => t,
        _ => return false,
    };

    match decode_claims(token) {
        Some(claims) => match claims.exp {
            Some(exp) => exp > now.timestamp(),
            None => true,
        },
        None => {
            debug!("Token did not decode as a JWT");
            false
        }
    }
}

/// [`is_valid_token_at`] against the current wall clock.
pub fn is_valid_token(token: Option<&str>) -> bool {
    is_valid_token_at(token, Utc::now())
}

/// Whether the token is already invalid or will expire within the buffer
/// window. Absent and malformed tokens count as expiring.
pub fn is_token_expiring_soon(token: Option<&str>) -> bool {
    let horizon = Utc::now() + Duration::minutes(TOKEN_EXPIRY_BUFFER_MINUTES);
    !is_valid_token_at(token, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build an unsigned JWT with the given payload JSON.
    fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.sig", header, body)
    }

    fn token_with_exp(exp: i64) -> String {
        make_token(&format!(r#"{{"sub":"u1","exp":{}}}"#, exp))
    }

    #[test]
    fn test_absent_and_blank_tokens_are_invalid() {
        assert!(!is_valid_token(None));
        assert!(!is_valid_token(Some("")));
        assert!(!is_valid_token(Some("   ")));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        assert!(!is_valid_token(Some("not-a-jwt")));
        assert!(!is_valid_token(Some("one.two")));
        assert!(!is_valid_token(Some("a.b.c.d")));
        // Valid structure, payload is not base64
        assert!(!is_valid_token(Some("head.!!!.sig")));
        // Valid base64, payload is not JSON
        let bad = format!("head.{}.sig", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(!is_valid_token(Some(&bad)));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let now = Utc::now();
        let token = token_with_exp((now - Duration::hours(1)).timestamp());
        assert!(!is_valid_token_at(Some(&token), now));

        // Expiring exactly now is also invalid
        let token = token_with_exp(now.timestamp());
        assert!(!is_valid_token_at(Some(&token), now));
    }

    #[test]
    fn test_unexpired_token_is_valid() {
        let now = Utc::now();
        let token = token_with_exp((now + Duration::hours(1)).timestamp());
        assert!(is_valid_token_at(Some(&token), now));
    }

    #[test]
    fn test_token_without_exp_claim_is_valid() {
        let token = make_token(r#"{"sub":"u1"}"#);
        assert!(is_valid_token(Some(&token)));
    }

    #[test]
    fn test_expiring_soon_window() {
        let now = Utc::now();
        // Expires in 2 minutes: inside the 5 minute buffer
        let near = token_with_exp((now + Duration::minutes(2)).timestamp());
        assert!(is_token_expiring_soon(Some(&near)));

        // Expires in an hour: comfortably outside
        let far = token_with_exp((now + Duration::hours(1)).timestamp());
        assert!(!is_token_expiring_soon(Some(&far)));

        assert!(is_token_expiring_soon(None));
    }
}
