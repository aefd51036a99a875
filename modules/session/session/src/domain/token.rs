//! Local expiry check for three-segment signed tokens.
//!
//! Only the `exp` claim of the payload is read; the signature is not
//! verified. The backend stays the authority on validity.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token does not have three non-empty segments")]
    Malformed,

    #[error("token payload is not valid base64")]
    Encoding,

    #[error("token payload is not a JSON object: {0}")]
    Payload(String),

    #[error("token payload has no numeric 'exp' claim")]
    MissingExpiry,

    #[error("token 'exp' claim is out of range: {0}")]
    ExpiryOutOfRange(i64),
}

/// Decode the `exp` claim (seconds since the epoch).
///
/// Accepts URL-safe or standard base64, with or without padding.
///
/// # Errors
/// Returns [`TokenError`] for anything but a well-formed token carrying a
/// numeric `exp`.
pub fn decode_expiry(token: &str) -> Result<OffsetDateTime, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };
    if header.is_empty() || payload.is_empty() || signature.is_empty() {
        return Err(TokenError::Malformed);
    }

    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| TokenError::Encoding)?;

    let claims: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    let Some(serde_json::Value::Number(n)) = claims.get("exp") else {
        return Err(TokenError::MissingExpiry);
    };
    let exp = match (n.as_i64(), n.as_f64()) {
        (Some(secs), _) => secs,
        (None, Some(secs)) => whole_seconds(secs),
        (None, None) => return Err(TokenError::MissingExpiry),
    };

    OffsetDateTime::from_unix_timestamp(exp).map_err(|_| TokenError::ExpiryOutOfRange(exp))
}

/// Fractional seconds are truncated; out-of-range values saturate and are
/// rejected by the timestamp conversion.
#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(secs: f64) -> i64 {
    secs as i64
}

/// `true` if `token` has expired at `now`, or cannot be decoded.
#[must_use]
pub fn is_expired(token: &str, now: OffsetDateTime) -> bool {
    match decode_expiry(token) {
        Ok(exp) => exp <= now,
        Err(e) => {
            tracing::debug!(error = %e, "treating undecodable token as expired");
            true
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};

    fn token_with(payload: &str, engine: &impl base64::Engine) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", engine.encode(payload))
    }

    fn at(secs: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(secs).unwrap()
    }

    #[test]
    fn reads_exp_in_every_encoding() {
        let payload = r#"{"sub":"42","exp":1700000000,"note":"??>"}"#;
        for engine in [&URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD_NO_PAD, &STANDARD] {
            let token = token_with(payload, engine);
            assert_eq!(decode_expiry(&token).unwrap(), at(1_700_000_000), "{token}");
        }
    }

    #[test]
    fn expiry_compares_against_now() {
        let token = token_with(r#"{"exp":1700000000}"#, &URL_SAFE_NO_PAD);
        assert!(!is_expired(&token, at(1_699_999_999)));
        assert!(is_expired(&token, at(1_700_000_000)));
        assert!(is_expired(&token, at(1_700_000_001)));
    }

    #[test]
    fn malformed_tokens_are_expired() {
        let now = at(0);
        for token in ["", "not-a-token", "a.b", "a.b.c.d", "a..c", "a.%%%.c"] {
            assert!(is_expired(token, now), "{token:?}");
        }
        assert_eq!(decode_expiry("a.b"), Err(TokenError::Malformed));
    }

    #[test]
    fn missing_or_non_numeric_exp_is_expired() {
        let now = at(0);
        let no_exp = token_with(r#"{"sub":"42"}"#, &URL_SAFE_NO_PAD);
        let text_exp = token_with(r#"{"exp":"tomorrow"}"#, &URL_SAFE_NO_PAD);
        let not_object = token_with("[1,2,3]", &URL_SAFE_NO_PAD);

        assert_eq!(decode_expiry(&no_exp), Err(TokenError::MissingExpiry));
        assert_eq!(decode_expiry(&text_exp), Err(TokenError::MissingExpiry));
        assert!(matches!(decode_expiry(&not_object), Err(TokenError::Payload(_))));
        assert!(is_expired(&no_exp, now));
        assert!(is_expired(&text_exp, now));
    }

    #[test]
    fn fractional_exp_is_truncated() {
        let token = token_with(r#"{"exp":1700000000.9}"#, &URL_SAFE_NO_PAD);
        assert_eq!(decode_expiry(&token).unwrap(), at(1_700_000_000));
    }

    #[test]
    fn huge_exp_is_out_of_range() {
        let token = token_with(r#"{"exp":1e300}"#, &URL_SAFE_NO_PAD);
        assert_eq!(decode_expiry(&token), Err(TokenError::ExpiryOutOfRange(i64::MAX)));
        assert!(is_expired(&token, at(0)));
    }
}
