//! Claim validation for decoded payloads
//!
//! Time claims (`exp`, `nbf`) are Unix seconds, read as `f64` so fractional
//! values and instants past 2038 are both fine. Every call takes exactly one
//! clock snapshot, truncated to whole seconds, and judges all claims
//! against it.

use crate::clock::{self, Clock, SystemClock};
use crate::error::{Error, Result};
use crate::limits::MAX_TIME_MARGIN_SECONDS;

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Which checks a decode performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationParameters {
    /// Verify the token signature
    pub validate_signature: bool,

    /// Reject tokens whose `exp` has passed
    pub validate_expiration_time: bool,

    /// Reject tokens whose `nbf` lies in the future
    pub validate_issued_time: bool,

    /// Clock skew tolerance in seconds, applied to `exp` and `nbf`
    ///
    /// At most [`MAX_TIME_MARGIN_SECONDS`](crate::limits::MAX_TIME_MARGIN_SECONDS);
    /// [`JwtValidator::new`] fails with [`Error::TimeMarginTooLarge`] above it.
    pub time_margin_seconds: u64,

    /// Fail when `exp` is absent
    pub require_expiration_time: bool,

    /// Fail when `nbf` is absent
    pub require_not_before: bool,
}

impl ValidationParameters {
    /// Every check disabled
    pub fn none() -> Self {
        Self {
            validate_signature: false,
            validate_expiration_time: false,
            validate_issued_time: false,
            time_margin_seconds: 0,
            require_expiration_time: false,
            require_not_before: false,
        }
    }

    /// Set clock skew tolerance
    ///
    /// Values above 300 seconds make [`JwtValidator::new`] fail with
    /// [`Error::TimeMarginTooLarge`].
    pub fn time_margin(mut self, seconds: u64) -> Self {
        self.time_margin_seconds = seconds;
        self
    }

    /// Disable signature verification
    pub fn no_signature_validation(mut self) -> Self {
        self.validate_signature = false;
        self
    }

    /// Disable expiration validation
    pub fn no_exp_validation(mut self) -> Self {
        self.validate_expiration_time = false;
        self
    }

    /// Disable not-before validation
    pub fn no_nbf_validation(mut self) -> Self {
        self.validate_issued_time = false;
        self
    }

    /// Treat a missing `exp` as a failure
    pub fn require_exp(mut self) -> Self {
        self.require_expiration_time = true;
        self
    }

    /// Treat a missing `nbf` as a failure
    pub fn require_nbf(mut self) -> Self {
        self.require_not_before = true;
        self
    }
}

impl Default for ValidationParameters {
    /// Signature, `exp` and `nbf` checked with zero margin
    fn default() -> Self {
        Self {
            validate_signature: true,
            validate_expiration_time: true,
            validate_issued_time: true,
            time_margin_seconds: 0,
            require_expiration_time: false,
            require_not_before: false,
        }
    }
}

/// Validates registered claims of a decoded payload
#[derive(Clone)]
pub struct JwtValidator {
    parameters: ValidationParameters,
    clock: Arc<dyn Clock>,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtValidator {
    /// Create a validator reading time from the system clock
    pub fn new(parameters: ValidationParameters) -> Result<Self> {
        if parameters.time_margin_seconds > MAX_TIME_MARGIN_SECONDS {
            return Err(Error::TimeMarginTooLarge {
                value: parameters.time_margin_seconds,
                max: MAX_TIME_MARGIN_SECONDS,
            });
        }

        Ok(Self {
            parameters,
            clock: Arc::new(SystemClock),
            issuer: None,
            audience: None,
        })
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        self.with_shared_clock(Arc::new(clock))
    }

    pub fn with_shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Require `iss`, when present, to equal `issuer`
    pub fn expect_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require `aud`, when present, to be or contain `audience`
    pub fn expect_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn parameters(&self) -> &ValidationParameters {
        &self.parameters
    }

    /// Whether [`validate`](Self::validate) has anything to check
    pub fn has_claim_checks(&self) -> bool {
        self.parameters.validate_expiration_time
            || self.parameters.validate_issued_time
            || self.parameters.require_expiration_time
            || self.parameters.require_not_before
            || self.issuer.is_some()
            || self.audience.is_some()
    }

    /// Validate the claims of a payload object
    pub fn validate(&self, payload: &Map<String, Value>) -> Result<()> {
        let now = clock::unix_seconds(self.clock.as_ref());
        let margin = self.parameters.time_margin_seconds as f64;

        if self.parameters.validate_expiration_time || self.parameters.require_expiration_time {
            match numeric_claim(payload, "exp")? {
                Some(exp) if self.parameters.validate_expiration_time && now - margin >= exp => {
                    debug!(exp, now, "token expired");
                    return Err(Error::TokenExpired {
                        expired_at: clock::instant_from_unix_seconds(exp),
                        payload: Box::new(payload.clone()),
                    });
                }
                Some(_) => {}
                None if self.parameters.require_expiration_time => {
                    return Err(Error::TokenMissingClaim("exp".into()));
                }
                None => {}
            }
        }

        if self.parameters.validate_issued_time || self.parameters.require_not_before {
            match numeric_claim(payload, "nbf")? {
                Some(nbf) if self.parameters.validate_issued_time && now + margin < nbf => {
                    debug!(nbf, now, "token not yet valid");
                    return Err(Error::TokenNotYetValid {
                        not_before: nbf,
                        now,
                        margin: self.parameters.time_margin_seconds,
                    });
                }
                Some(_) => {}
                None if self.parameters.require_not_before => {
                    return Err(Error::TokenMissingClaim("nbf".into()));
                }
                None => {}
            }
        }

        if let (Some(expected), Some(found)) = (&self.issuer, payload.get("iss")) {
            if found.as_str() != Some(expected.as_str()) {
                debug!(expected = %expected, "issuer mismatch");
                return Err(Error::TokenIssuerMismatch {
                    expected: expected.clone(),
                    found: display_value(found),
                });
            }
        }

        if let (Some(expected), Some(found)) = (&self.audience, payload.get("aud")) {
            let audiences = audience_values(found);
            if !audiences.iter().any(|aud| aud == expected) {
                debug!(expected = %expected, "audience mismatch");
                return Err(Error::TokenAudienceMismatch {
                    expected: expected.clone(),
                    found: audiences,
                });
            }
        }

        Ok(())
    }
}

impl Default for JwtValidator {
    fn default() -> Self {
        Self {
            parameters: ValidationParameters::default(),
            clock: Arc::new(SystemClock),
            issuer: None,
            audience: None,
        }
    }
}

impl std::fmt::Debug for JwtValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtValidator")
            .field("parameters", &self.parameters)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

/// Read a time claim; present but non-numeric is an error
fn numeric_claim(payload: &Map<String, Value>, name: &str) -> Result<Option<f64>> {
    match payload.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::ClaimNotNumeric(name.to_string())),
    }
}

/// `aud` is a string or an array of strings (RFC 7519 §4.1.3)
fn audience_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(display_value).collect(),
        other => vec![display_value(other)],
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000;

    fn validator(parameters: ValidationParameters) -> JwtValidator {
        JwtValidator::new(parameters)
            .unwrap()
            .with_clock(FixedClock::at_unix_seconds(NOW))
    }

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_expiration_boundary() {
        let v = validator(ValidationParameters::default());
        let now = NOW as f64;

        let result = v.validate(&payload(json!({ "exp": now })));
        assert!(
            matches!(result, Err(Error::TokenExpired { .. })),
            "exp == now must be expired"
        );
        assert!(v.validate(&payload(json!({ "exp": now + 1.0 }))).is_ok());
    }

    #[test]
    fn test_expired_error_carries_instant_and_payload() {
        let v = validator(ValidationParameters::default());
        let claims = payload(json!({ "sub": "bob", "exp": NOW - 10 }));
        match v.validate(&claims) {
            Err(Error::TokenExpired {
                expired_at,
                payload,
            }) => {
                assert_eq!(expired_at, FixedClock::at_unix_seconds(NOW - 10).now());
                assert_eq!(*payload, claims);
            }
            other => panic!("expected TokenExpired, got {other:?}"),
        }
    }

    #[test]
    fn test_not_before_boundary() {
        let v = validator(ValidationParameters::default());
        assert!(v.validate(&payload(json!({ "nbf": NOW }))).is_ok());
        assert!(matches!(
            v.validate(&payload(json!({ "nbf": NOW + 1 }))),
            Err(Error::TokenNotYetValid { .. })
        ));
    }

    #[test]
    fn test_time_margin_extends_both_bounds() {
        let v = validator(ValidationParameters::default().time_margin(30));
        assert!(v.validate(&payload(json!({ "exp": NOW - 29 }))).is_ok());
        assert!(v.validate(&payload(json!({ "exp": NOW - 30 }))).is_err());
        assert!(v.validate(&payload(json!({ "nbf": NOW + 30 }))).is_ok());
        assert!(v.validate(&payload(json!({ "nbf": NOW + 31 }))).is_err());
    }

    #[test]
    fn test_time_margin_bound() {
        assert!(matches!(
            JwtValidator::new(ValidationParameters::default().time_margin(301)),
            Err(Error::TimeMarginTooLarge { value: 301, max: 300 })
        ));
        assert!(JwtValidator::new(ValidationParameters::default().time_margin(300)).is_ok());
    }

    #[test]
    fn test_non_numeric_claims() {
        let v = validator(ValidationParameters::default());
        let result = v.validate(&payload(json!({ "exp": "tomorrow" })));
        assert!(matches!(&result, Err(Error::ClaimNotNumeric(name)) if name == "exp"));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Claim 'exp' must be a number"
        );

        assert!(matches!(
            v.validate(&payload(json!({ "nbf": null }))),
            Err(Error::ClaimNotNumeric(name)) if name == "nbf"
        ));
    }

    #[test]
    fn test_fractional_and_post_2038_times() {
        let v = validator(ValidationParameters::default());
        assert!(v.validate(&payload(json!({ "exp": NOW as f64 + 0.5 }))).is_ok());
        assert!(v.validate(&payload(json!({ "exp": 4_102_444_800u64 }))).is_ok());
    }

    #[test]
    fn test_absent_claims_pass_unless_required() {
        let v = validator(ValidationParameters::default());
        assert!(v.validate(&Map::new()).is_ok());

        let strict = validator(ValidationParameters::default().require_exp());
        assert!(matches!(
            strict.validate(&Map::new()),
            Err(Error::TokenMissingClaim(name)) if name == "exp"
        ));

        let strict = validator(ValidationParameters::none().require_nbf());
        assert!(matches!(
            strict.validate(&Map::new()),
            Err(Error::TokenMissingClaim(name)) if name == "nbf"
        ));
    }

    #[test]
    fn test_disabled_checks_are_skipped() {
        let v = validator(ValidationParameters::none());
        assert!(!v.has_claim_checks());
        assert!(v.validate(&payload(json!({ "exp": 0, "nbf": "x" }))).is_ok());
    }

    #[test]
    fn test_issuer() {
        let v = validator(ValidationParameters::none()).expect_issuer("https://issuer.example");
        assert!(v.has_claim_checks());
        assert!(v.validate(&payload(json!({ "iss": "https://issuer.example" }))).is_ok());
        assert!(v.validate(&Map::new()).is_ok());

        match v.validate(&payload(json!({ "iss": "https://evil.example" }))) {
            Err(err @ Error::TokenIssuerMismatch { .. }) => {
                assert!(err.is_validation_failure());
                let message = err.to_string();
                assert!(message.contains("https://issuer.example"));
                assert!(message.contains("https://evil.example"));
            }
            other => panic!("expected issuer mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_audience_string_or_array() {
        let v = validator(ValidationParameters::none()).expect_audience("api");
        assert!(v.validate(&payload(json!({ "aud": "api" }))).is_ok());
        assert!(v.validate(&payload(json!({ "aud": ["web", "api"] }))).is_ok());
        assert!(matches!(
            v.validate(&payload(json!({ "aud": ["web"] }))),
            Err(Error::TokenAudienceMismatch { found, .. }) if found == vec!["web".to_string()]
        ));
        assert!(matches!(
            v.validate(&payload(json!({ "aud": "API" }))),
            Err(Error::TokenAudienceMismatch { .. })
        ));
    }
}
