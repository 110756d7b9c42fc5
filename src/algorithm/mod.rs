//! Signing algorithms and algorithm policy
//!
//! Every algorithm implements [`SigningAlgorithm`]. Symmetric algorithms
//! (HMAC) take their secret at call time; asymmetric algorithms (RSA, ECDSA)
//! own a public key plus an optional private key and additionally implement
//! [`AsymmetricAlgorithm`]. `none` exists only for explicit opt-in and
//! refuses to sign.

mod traits;

pub mod ecdsa;
pub mod hmac;
pub mod none;
pub mod rsa;

pub use traits::{AsymmetricAlgorithm, SharedAlgorithm, SigningAlgorithm};

use crate::error::{Error, Result};
use crate::limits::MAX_ALG_LENGTH;

/// Algorithm identifier from JWT header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// HMAC with SHA-256
    HS256,

    /// HMAC with SHA-384
    HS384,

    /// HMAC with SHA-512
    HS512,

    /// RSA PKCS#1 v1.5 with SHA-256
    RS256,

    /// RSA PKCS#1 v1.5 with SHA-384
    RS384,

    /// RSA PKCS#1 v1.5 with SHA-512
    RS512,

    /// ECDSA with P-256 and SHA-256
    ES256,

    /// ECDSA with P-384 and SHA-384
    ES384,

    /// ECDSA with P-521 and SHA-512
    ES512,

    /// Unsecured JWT (`alg: "none"`)
    None,
}

/// Algorithm family
///
/// Factories are scoped to exactly one family; a header `alg` from another
/// family is never honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    Hmac,
    Rsa,
    Ecdsa,
    None,
}

impl AlgorithmFamily {
    /// Algorithms belonging to this family
    pub fn algorithms(&self) -> &'static [AlgorithmId] {
        match self {
            AlgorithmFamily::Hmac => &[AlgorithmId::HS256, AlgorithmId::HS384, AlgorithmId::HS512],
            AlgorithmFamily::Rsa => &[AlgorithmId::RS256, AlgorithmId::RS384, AlgorithmId::RS512],
            AlgorithmFamily::Ecdsa => &[AlgorithmId::ES256, AlgorithmId::ES384, AlgorithmId::ES512],
            AlgorithmFamily::None => &[AlgorithmId::None],
        }
    }

    /// Kind of key this family signs and verifies with
    pub const fn key_type(&self) -> &'static str {
        match self {
            AlgorithmFamily::Hmac => "HMAC secret",
            AlgorithmFamily::Rsa => "RSA key",
            AlgorithmFamily::Ecdsa => "EC key",
            AlgorithmFamily::None => "no key",
        }
    }
}

impl AlgorithmId {
    /// Parse algorithm string from JWT header
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        if s.len() > MAX_ALG_LENGTH {
            return Err(Error::AlgorithmUnsupported(format!(
                "algorithm string too long: {} bytes (maximum: {MAX_ALG_LENGTH} bytes)",
                s.len()
            )));
        }

        match s {
            "HS256" => Ok(AlgorithmId::HS256),
            "HS384" => Ok(AlgorithmId::HS384),
            "HS512" => Ok(AlgorithmId::HS512),
            "RS256" => Ok(AlgorithmId::RS256),
            "RS384" => Ok(AlgorithmId::RS384),
            "RS512" => Ok(AlgorithmId::RS512),
            "ES256" => Ok(AlgorithmId::ES256),
            "ES384" => Ok(AlgorithmId::ES384),
            "ES512" => Ok(AlgorithmId::ES512),
            "none" => Ok(AlgorithmId::None),
            _ => Err(Error::AlgorithmUnsupported(s.to_string())),
        }
    }

    /// Convert to string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::HS512 => "HS512",
            AlgorithmId::RS256 => "RS256",
            AlgorithmId::RS384 => "RS384",
            AlgorithmId::RS512 => "RS512",
            AlgorithmId::ES256 => "ES256",
            AlgorithmId::ES384 => "ES384",
            AlgorithmId::ES512 => "ES512",
            AlgorithmId::None => "none",
        }
    }

    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            AlgorithmId::HS256 | AlgorithmId::HS384 | AlgorithmId::HS512 => AlgorithmFamily::Hmac,
            AlgorithmId::RS256 | AlgorithmId::RS384 | AlgorithmId::RS512 => AlgorithmFamily::Rsa,
            AlgorithmId::ES256 | AlgorithmId::ES384 | AlgorithmId::ES512 => AlgorithmFamily::Ecdsa,
            AlgorithmId::None => AlgorithmFamily::None,
        }
    }

    /// Check if algorithm is HMAC-based (symmetric)
    pub fn is_symmetric(&self) -> bool {
        self.family() == AlgorithmFamily::Hmac
    }

    /// Check if algorithm is asymmetric (RSA/ECDSA)
    pub fn is_asymmetric(&self) -> bool {
        matches!(self.family(), AlgorithmFamily::Rsa | AlgorithmFamily::Ecdsa)
    }
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for AlgorithmId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Policy for allowed algorithms
///
/// A policy narrows what a factory accepts inside its own family. It can
/// never widen a factory beyond that family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmId>,
}

impl AlgorithmPolicy {
    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmId>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Policy that allows every algorithm of one family
    pub fn family(family: AlgorithmFamily) -> Self {
        Self::allow_only(family.algorithms().to_vec())
    }

    /// Policy that allows only HS256
    pub fn hs256_only() -> Self {
        Self::allow_only(vec![AlgorithmId::HS256])
    }

    /// Policy that allows HS256, HS384 and HS512
    pub fn hmac_any() -> Self {
        Self::family(AlgorithmFamily::Hmac)
    }

    /// Policy that allows only RS256
    pub fn rs256_only() -> Self {
        Self::allow_only(vec![AlgorithmId::RS256])
    }

    /// Policy that allows RS256, RS384 and RS512
    pub fn rsa_any() -> Self {
        Self::family(AlgorithmFamily::Rsa)
    }

    /// Policy that allows only ES256
    pub fn es256_only() -> Self {
        Self::allow_only(vec![AlgorithmId::ES256])
    }

    /// Policy that allows ES256, ES384 and ES512
    pub fn ecdsa_any() -> Self {
        Self::family(AlgorithmFamily::Ecdsa)
    }

    /// Check if an algorithm is allowed
    pub fn is_allowed(&self, algorithm: &AlgorithmId) -> bool {
        self.allowed.contains(algorithm)
    }

    /// Validate algorithm against policy
    pub fn validate(&self, algorithm: &AlgorithmId) -> Result<()> {
        if self.is_allowed(algorithm) {
            Ok(())
        } else {
            Err(Error::AlgorithmNotAllowed {
                found: algorithm.to_string(),
                allowed: self.allowed.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Get list of allowed algorithms
    pub fn allowed_algorithms(&self) -> &[AlgorithmId] {
        &self.allowed
    }
}

/// Resolve a header `alg` inside one family and policy
///
/// Unknown names and names from another family are unsupported; names from
/// the family that the policy excludes are not allowed.
pub(crate) fn resolve_in_family(
    alg: &str,
    family: AlgorithmFamily,
    policy: &AlgorithmPolicy,
) -> Result<AlgorithmId> {
    let id = AlgorithmId::from_str(alg)?;
    if id.family() != family {
        return Err(Error::AlgorithmUnsupported(id.to_string()));
    }
    policy.validate(&id)?;
    Ok(id)
}
