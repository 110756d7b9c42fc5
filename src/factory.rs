//! Capability-scoped algorithm factories
//!
//! A decoder never turns the header `alg` into an algorithm on its own. It
//! asks an [`AlgorithmFactory`] that was configured up front for one family
//! (or one fixed algorithm), and `alg` only selects inside that set. An
//! HMAC-only factory asked for `RS256` answers
//! [`Error::AlgorithmUnsupported`]; `none` is only ever produced by the
//! explicit [`NoneAlgorithmFactory`].

use crate::algorithm::ecdsa::EcdsaAlgorithm;
use crate::algorithm::none::NoneAlgorithm;
use crate::algorithm::rsa::{self, RsaAlgorithm};
use crate::algorithm::{
    AlgorithmFamily, AlgorithmId, AlgorithmPolicy, SharedAlgorithm, SigningAlgorithm, hmac,
    resolve_in_family,
};
use crate::error::{Error, Result};
use crate::token::{JwtHeader, JwtParts};

use aws_lc_rs::signature::RsaKeyPair;
use std::sync::Arc;

/// What a factory gets to look at when picking an algorithm
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmContext<'a> {
    header: &'a JwtHeader,
    parts: &'a JwtParts,
}

impl<'a> AlgorithmContext<'a> {
    pub fn new(header: &'a JwtHeader, parts: &'a JwtParts) -> Self {
        Self { header, parts }
    }

    /// Decoded token header
    pub fn header(&self) -> &'a JwtHeader {
        self.header
    }

    /// Raw token segments
    pub fn parts(&self) -> &'a JwtParts {
        self.parts
    }

    /// Header `alg` as written in the token
    pub fn algorithm(&self) -> &'a str {
        &self.header.alg
    }
}

/// Resolves the signing algorithm for a token
///
/// Any `Fn(&AlgorithmContext<'_>) -> Result<SharedAlgorithm>` closure is a
/// factory, for callers that need custom selection logic.
pub trait AlgorithmFactory: Send + Sync {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm>;
}

impl<F> AlgorithmFactory for F
where
    F: Fn(&AlgorithmContext<'_>) -> Result<SharedAlgorithm> + Send + Sync,
{
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        self(context)
    }
}

// ============================================================================
// HMAC
// ============================================================================

/// HS256/HS384/HS512; secrets are supplied per decode call
#[derive(Debug, Clone)]
pub struct HmacAlgorithmFactory {
    policy: AlgorithmPolicy,
}

impl HmacAlgorithmFactory {
    pub fn new() -> Self {
        Self {
            policy: AlgorithmPolicy::hmac_any(),
        }
    }

    /// Narrow accepted HMAC algorithms (e.g. [`AlgorithmPolicy::hs256_only`])
    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for HmacAlgorithmFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmFactory for HmacAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        let id = resolve_in_family(context.algorithm(), AlgorithmFamily::Hmac, &self.policy)?;
        hmac::shared(id)
    }
}

// ============================================================================
// RSA
// ============================================================================

/// RS256/RS384/RS512 bound to one RSA key
///
/// `Default` yields a factory with no key; it still recognizes RSA
/// algorithms but answers [`Error::AlgorithmNotConfigured`].
#[derive(Clone)]
pub struct RsaAlgorithmFactory {
    public_key: Option<Vec<u8>>,
    key_pair: Option<Arc<RsaKeyPair>>,
    policy: AlgorithmPolicy,
}

impl RsaAlgorithmFactory {
    /// Verify-only factory from a DER public key
    pub fn new(public_key_der: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key: Some(public_key_der.into()),
            ..Self::default()
        }
    }

    /// Factory whose algorithms can also sign, from a PKCS#8 DER private key
    pub fn from_private_key(pkcs8_der: &[u8]) -> Result<Self> {
        Ok(Self {
            key_pair: Some(rsa::parse_private_key(pkcs8_der)?),
            ..Self::default()
        })
    }

    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for RsaAlgorithmFactory {
    fn default() -> Self {
        Self {
            public_key: None,
            key_pair: None,
            policy: AlgorithmPolicy::rsa_any(),
        }
    }
}

impl AlgorithmFactory for RsaAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        let id = resolve_in_family(context.algorithm(), AlgorithmFamily::Rsa, &self.policy)?;
        let algorithm = match (&self.key_pair, &self.public_key) {
            (Some(key_pair), _) => RsaAlgorithm::from_key_pair(id, Arc::clone(key_pair))?,
            (None, Some(public_key)) => RsaAlgorithm::new(id, public_key.clone())?,
            (None, None) => return Err(Error::AlgorithmNotConfigured(id.to_string())),
        };
        Ok(Arc::new(algorithm))
    }
}

impl std::fmt::Debug for RsaAlgorithmFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaAlgorithmFactory")
            .field("has_public_key", &self.public_key.is_some())
            .field("has_private_key", &self.key_pair.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

// ============================================================================
// ECDSA
// ============================================================================

/// ES256/ES384/ES512, one configured key per curve
#[derive(Clone, Default)]
pub struct EcdsaAlgorithmFactory {
    algorithms: Vec<Arc<EcdsaAlgorithm>>,
    policy: Option<AlgorithmPolicy>,
}

impl EcdsaAlgorithmFactory {
    /// Factory with no keys; add them with [`with_algorithm`](Self::with_algorithm)
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key for one curve, replacing any earlier key for it
    pub fn with_algorithm(mut self, algorithm: EcdsaAlgorithm) -> Self {
        self.algorithms.retain(|a| a.curve() != algorithm.curve());
        self.algorithms.push(Arc::new(algorithm));
        self
    }

    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

impl AlgorithmFactory for EcdsaAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        let policy = self
            .policy
            .clone()
            .unwrap_or_else(AlgorithmPolicy::ecdsa_any);
        let id = resolve_in_family(context.algorithm(), AlgorithmFamily::Ecdsa, &policy)?;
        self.algorithms
            .iter()
            .find(|a| a.id() == id)
            .map(|a| Arc::clone(a) as SharedAlgorithm)
            .ok_or_else(|| Error::AlgorithmNotConfigured(id.to_string()))
    }
}

impl std::fmt::Debug for EcdsaAlgorithmFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaAlgorithmFactory")
            .field(
                "algorithms",
                &self.algorithms.iter().map(|a| a.id()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

// ============================================================================
// Fixed and none
// ============================================================================

/// Exactly one pre-built algorithm; any other `alg` is unsupported
#[derive(Clone)]
pub struct FixedAlgorithmFactory {
    algorithm: SharedAlgorithm,
}

impl FixedAlgorithmFactory {
    pub fn new(algorithm: impl SigningAlgorithm + 'static) -> Self {
        Self::from_shared(Arc::new(algorithm))
    }

    pub fn from_shared(algorithm: SharedAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl AlgorithmFactory for FixedAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        if context.algorithm() == self.algorithm.name() {
            Ok(Arc::clone(&self.algorithm))
        } else {
            Err(Error::AlgorithmUnsupported(context.algorithm().to_string()))
        }
    }
}

impl std::fmt::Debug for FixedAlgorithmFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedAlgorithmFactory")
            .field("algorithm", &self.algorithm.id())
            .finish()
    }
}

/// Explicit opt-in for `alg: "none"`
///
/// The returned algorithm refuses to sign, so verified decoding still
/// fails; this factory only makes the rejection deliberate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlgorithmFactory;

impl AlgorithmFactory for NoneAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        match AlgorithmId::from_str(context.algorithm())? {
            AlgorithmId::None => Ok(Arc::new(NoneAlgorithm)),
            other => Err(Error::AlgorithmUnsupported(other.to_string())),
        }
    }
}
