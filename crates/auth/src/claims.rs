//! Client-side decoding of session token claims
//!
//! The token is a JWT issued by the backend. Only the payload is read here;
//! the signature is **not** verified. [`is_valid`] is an optimistic
//! freshness check that saves a round trip with a token the backend would
//! reject anyway. It is not an authorization boundary: the backend verifies
//! every token it receives.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// JWT segments are unpadded, but some issuers pad anyway
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded token payload
///
/// Claims are read one by one from the payload object, so an unexpected
/// type in one claim does not discard the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Claims {
    /// Subject identifier as issued by the TerraMartz backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Standard JWT subject, accepted in place of `id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiry in epoch seconds, fractions allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,

    /// Issue time in epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,

    /// Any other claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Read claims out of a payload object
    ///
    /// Returns `None` only when `exp` is present but not a number, since the
    /// expiry could not be checked.
    pub fn from_payload(mut payload: Map<String, Value>) -> Option<Self> {
        let exp = match payload.remove("exp") {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.as_f64()?),
        };

        Some(Self {
            id: payload.remove("id").filter(|v| !v.is_null()),
            sub: take_string(&mut payload, "sub"),
            role: take_string(&mut payload, "role"),
            exp,
            iat: payload.remove("iat").and_then(|v| v.as_f64()),
            extra: payload,
        })
    }

    /// The subject identifier, from `id` or else `sub`
    pub fn subject(&self) -> Option<String> {
        let id = match &self.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        id.filter(|s| !s.is_empty())
            .or_else(|| self.sub.clone().filter(|s| !s.is_empty()))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|exp| Utc.timestamp_millis_opt((exp * 1000.0) as i64).single())
    }

    /// Whether `exp` is present and not after `now` (epoch seconds)
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp <= now as f64)
    }
}

// A claim of another type is left in `extra`
fn take_string(payload: &mut Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key) {
        Some(Value::String(_)) => match payload.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Decode the payload segment of a token
///
/// Returns `None` for anything that is not three dot-separated base64url
/// segments with a JSON object payload, or whose `exp` is not numeric.
pub fn decode(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || header.is_empty() || payload.is_empty() {
        return None;
    }

    URL_SAFE_LENIENT.decode(header).ok()?;
    let bytes = URL_SAFE_LENIENT.decode(payload).ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Claims::from_payload(map),
        _ => None,
    }
}

/// Current time in epoch seconds
pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

/// Whether the token decodes, has a subject and has not expired
pub fn is_valid(token: &str) -> bool {
    is_valid_at(token, now_epoch_secs())
}

/// [`is_valid`] against an explicit clock
pub fn is_valid_at(token: &str, now: i64) -> bool {
    match decode(token) {
        Some(claims) => !claims.is_expired_at(now) && claims.subject().is_some(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use serde_json::json;

    fn token_with(payload: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, body)
    }

    #[test]
    fn test_decode_reads_claims() {
        let token = token_with(json!({"id": "u1", "role": "admin", "exp": 2000, "shop": "x"}));
        let claims = decode(&token).unwrap();

        assert_eq!(claims.subject(), Some("u1".to_string()));
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert_eq!(claims.exp, Some(2000.0));
        assert_eq!(claims.extra.get("shop"), Some(&json!("x")));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let inputs = [
            "",
            "abc",
            "a.b",
            "a.b.c.d",
            ".payload.sig",
            "header..sig",
            "!!!.???.sig",
            "eyJhbGciOiJIUzI1NiJ9.bm90IGpzb24.sig",
            // a JSON array is not a claims record
            "eyJhbGciOiJIUzI1NiJ9.WzEsMl0.sig",
        ];

        for input in inputs {
            assert!(decode(input).is_none(), "decoded {:?}", input);
            assert!(!is_valid(input), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_decode_tolerates_padding() {
        let token = token_with(json!({"id": "u1"}));
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        while parts[1].len() % 4 != 0 {
            parts[1].push('=');
        }

        assert!(decode(&parts.join(".")).is_some());
    }

    #[test]
    fn test_expiry_is_checked() {
        let token = token_with(json!({"id": "u1", "exp": 1_000}));

        assert!(is_valid_at(&token, 999));
        assert!(!is_valid_at(&token, 1_000));
        assert!(!is_valid_at(&token, 5_000));
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        assert!(!is_valid_at(&token_with(json!({"exp": 9_999_999_999i64})), 0));
        assert!(!is_valid_at(&token_with(json!({"role": "admin"})), 0));
        assert!(!is_valid_at(&token_with(json!({"id": ""})), 0));
        assert!(!is_valid_at(&token_with(json!({"id": null, "exp": 10})), 0));
    }

    #[test]
    fn test_sub_and_numeric_id_count_as_subject() {
        assert!(is_valid_at(&token_with(json!({"sub": "u2"})), 0));
        assert!(is_valid_at(&token_with(json!({"id": 42})), 0));
        assert_eq!(
            decode(&token_with(json!({"id": 42}))).unwrap().subject(),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_no_exp_never_expires() {
        let token = token_with(json!({"id": "u1"}));
        assert!(is_valid_at(&token, i64::MAX));
        assert_eq!(decode(&token).unwrap().expires_at(), None);
    }

    #[test]
    fn test_mistyped_claim_keeps_valid_subject() {
        let token = token_with(json!({"id": "u1", "sub": 42, "role": ["admin"], "exp": 9_999_999_999i64}));
        let claims = decode(&token).unwrap();

        assert_eq!(claims.subject(), Some("u1".to_string()));
        assert_eq!(claims.sub, None);
        assert_eq!(claims.role, None);
        assert_eq!(claims.extra.get("sub"), Some(&json!(42)));
        assert!(is_valid_at(&token, 0));
    }

    #[test]
    fn test_fractional_exp() {
        let token = token_with(json!({"id": "u1", "exp": 1_000.5}));

        assert!(is_valid_at(&token, 1_000));
        assert!(!is_valid_at(&token, 1_001));
        assert_eq!(
            decode(&token).unwrap().expires_at().map(|t| t.timestamp_millis()),
            Some(1_000_500)
        );
    }

    #[test]
    fn test_non_numeric_exp_is_invalid() {
        let token = token_with(json!({"id": "u1", "exp": "tomorrow"}));

        assert!(decode(&token).is_none());
        assert!(!is_valid_at(&token, 0));
        assert!(is_valid_at(&token_with(json!({"id": "u1", "exp": null})), 0));
    }
}
