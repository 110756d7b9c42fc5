//! Errors for jwtcraft
//!
//! Every failure in the encode/decode pipeline surfaces as one variant of
//! [`Error`]. Variants carry typed context (expected and received signatures,
//! the expiration instant, the payload snapshot) so callers can tell a bad
//! signature from an expired token from a malformed claim without parsing
//! messages.

use serde_json::{Map, Value};
use std::time::SystemTime;
use thiserror::Error;

/// jwtcraft errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    #[error("Invalid JWT format: expected three parts separated by '.', found {segments}")]
    FormatInvalid { segments: usize },

    #[error("Base64URL decoding failed: {0}")]
    FormatInvalidBase64(String),

    #[error("JSON parsing failed: {0}")]
    FormatInvalidJson(String),

    #[error("JSON serialization failed: {0}")]
    JsonSerialization(String),

    // ============================================================================
    // Algorithm Errors
    // ============================================================================
    #[error("Algorithm '{0}' is not supported by the configured algorithm factory")]
    AlgorithmUnsupported(String),

    #[error("Algorithm '{0}' has no key material or delegate configured")]
    AlgorithmNotConfigured(String),

    #[error("Algorithm '{found}' not allowed. Allowed: {allowed:?}")]
    AlgorithmNotAllowed { found: String, allowed: Vec<String> },

    // ============================================================================
    // Signature Errors
    // ============================================================================
    #[error("Invalid signature. Expected {} got {received}", .expected.join(", "))]
    SignatureMismatch {
        expected: Vec<String>,
        received: String,
    },

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Key ID (kid) is missing from the token header")]
    KeyIdMissing,

    #[error("Key ID '{0}' is not present in the key set")]
    KeyIdUnknown(String),

    // ============================================================================
    // Claim Errors
    // ============================================================================
    #[error("Claim '{0}' must be a number")]
    ClaimNotNumeric(String),

    #[error("Token is not yet valid (nbf: {not_before}, now: {now}, margin: {margin}s)")]
    TokenNotYetValid {
        not_before: f64,
        now: f64,
        margin: u64,
    },

    #[error("Token has expired (exp: {expired_at:?})")]
    TokenExpired {
        expired_at: SystemTime,
        payload: Box<Map<String, Value>>,
    },

    #[error("Token issuer mismatch: expected '{expected}', found '{found}'")]
    TokenIssuerMismatch { expected: String, found: String },

    #[error("Token audience mismatch: expected '{expected}', found {found:?}")]
    TokenAudienceMismatch {
        expected: String,
        found: Vec<String>,
    },

    #[error("Required token claim '{0}' is missing")]
    TokenMissingClaim(String),

    // ============================================================================
    // Key Errors
    // ============================================================================
    #[error("At least one key is required for signature verification")]
    KeySetEmpty,

    #[error("Key at index {index} is empty")]
    KeyEmpty { index: usize },

    #[error("Key rejected: {0}")]
    KeyInvalid(String),

    #[error(
        "Key type mismatch for algorithm '{algorithm}': expected {expected_key_type}, got {actual_key_type}"
    )]
    KeyTypeMismatch {
        algorithm: String,
        expected_key_type: String,
        actual_key_type: String,
    },

    // ============================================================================
    // Usage Errors
    // ============================================================================
    #[error("Argument '{0}' is required")]
    ArgumentMissing(String),

    #[error("Invalid operation: {0}")]
    OperationInvalid(String),

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    #[error("Time margin too large: {value} seconds (maximum: {max} seconds)")]
    TimeMarginTooLarge { value: u64, max: u64 },
}

impl Error {
    /// Structural problem with the token string itself
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::TokenTooLarge { .. }
                | Error::FormatInvalid { .. }
                | Error::FormatInvalidBase64(_)
                | Error::FormatInvalidJson(_)
        )
    }

    /// A correctly shaped token that cannot be trusted (yet)
    ///
    /// Covers signature mismatches, non-numeric time claims, premature and
    /// expired tokens, and unresolvable key ids.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            Error::SignatureMismatch { .. }
                | Error::SignatureInvalid
                | Error::KeyIdMissing
                | Error::KeyIdUnknown(_)
                | Error::ClaimNotNumeric(_)
                | Error::TokenNotYetValid { .. }
                | Error::TokenExpired { .. }
        )
    }

    /// A correctly signed token failing issuer/audience constraints
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Error::TokenIssuerMismatch { .. }
                | Error::TokenAudienceMismatch { .. }
                | Error::TokenMissingClaim(_)
        )
    }

    /// Misconfiguration of the encoder, decoder or algorithm wiring
    pub fn is_configuration_failure(&self) -> bool {
        matches!(
            self,
            Error::AlgorithmUnsupported(_)
                | Error::AlgorithmNotConfigured(_)
                | Error::AlgorithmNotAllowed { .. }
                | Error::OperationInvalid(_)
                | Error::OperationNotSupported(_)
                | Error::TimeMarginTooLarge { .. }
        )
    }
}

/// Result type alias for jwtcraft operations
pub type Result<T> = std::result::Result<T, Error>;
