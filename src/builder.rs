//! Fluent configuration over [`JwtEncoder`] and [`JwtDecoder`]
//!
//! ```ignore
//! let token = JwtBuilder::new()
//!     .with_algorithm(HS256)
//!     .with_serializer(SerdeJsonSerializer)
//!     .with_secret(b"secret")
//!     .add_claim(RegisteredClaim::Subject, "user-1")
//!     .add_claim(RegisteredClaim::ExpirationTime, 1_900_000_000)
//!     .encode()?;
//! ```

use crate::algorithm::{SharedAlgorithm, SigningAlgorithm};
use crate::clock::Clock;
use crate::decoder::JwtDecoder;
use crate::encoder::JwtEncoder;
use crate::error::{Error, Result};
use crate::factory::{AlgorithmFactory, FixedAlgorithmFactory};
use crate::serializer::JsonSerializer;
use crate::validator::JwtValidator;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Registered claim names (RFC 7519 §4.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisteredClaim {
    Issuer,
    Subject,
    Audience,
    ExpirationTime,
    NotBefore,
    IssuedAt,
    JwtId,
}

impl RegisteredClaim {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegisteredClaim::Issuer => "iss",
            RegisteredClaim::Subject => "sub",
            RegisteredClaim::Audience => "aud",
            RegisteredClaim::ExpirationTime => "exp",
            RegisteredClaim::NotBefore => "nbf",
            RegisteredClaim::IssuedAt => "iat",
            RegisteredClaim::JwtId => "jti",
        }
    }
}

impl fmt::Display for RegisteredClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RegisteredClaim> for String {
    fn from(claim: RegisteredClaim) -> Self {
        claim.as_str().to_string()
    }
}

/// Builder for encoding and decoding tokens
///
/// Configuration methods take `&mut self` so a builder can be set up in
/// steps; [`build`](Self::build) returns an owned copy.
///
/// Signature verification is on by default. Without an explicit factory,
/// decoding accepts only the configured algorithm.
#[derive(Clone, Default)]
pub struct JwtBuilder {
    algorithm: Option<SharedAlgorithm>,
    secrets: Vec<Vec<u8>>,
    factory: Option<Arc<dyn AlgorithmFactory>>,
    headers: Map<String, Value>,
    claims: Map<String, Value>,
    serializer: Option<Arc<dyn JsonSerializer>>,
    validator: Option<JwtValidator>,
    clock: Option<Arc<dyn Clock>>,
    skip_verification: bool,
}

impl JwtBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Algorithm used for encoding, and for decoding when no factory is set
    pub fn with_algorithm(&mut self, algorithm: impl SigningAlgorithm + 'static) -> &mut Self {
        self.with_shared_algorithm(Arc::new(algorithm))
    }

    pub fn with_shared_algorithm(&mut self, algorithm: SharedAlgorithm) -> &mut Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Add a secret
    ///
    /// Repeat to verify against several keys; encoding signs with the first.
    pub fn with_secret(&mut self, secret: impl AsRef<[u8]>) -> &mut Self {
        self.secrets.push(secret.as_ref().to_vec());
        self
    }

    /// Factory resolving the verification algorithm from the token header
    pub fn with_factory(&mut self, factory: impl AlgorithmFactory + 'static) -> &mut Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn add_claim(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    pub fn with_serializer(&mut self, serializer: impl JsonSerializer + 'static) -> &mut Self {
        self.serializer = Some(Arc::new(serializer));
        self
    }

    pub fn with_validator(&mut self, validator: JwtValidator) -> &mut Self {
        self.validator = Some(validator);
        self
    }

    /// Clock for claim validation; overrides the validator's clock
    pub fn with_clock(&mut self, clock: impl Clock + 'static) -> &mut Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn must_verify_signature(&mut self) -> &mut Self {
        self.skip_verification = false;
        self
    }

    pub fn do_not_verify_signature(&mut self) -> &mut Self {
        self.skip_verification = true;
        self
    }

    pub fn build(&mut self) -> Self {
        self.clone()
    }

    // ============================================================================
    // Encoding
    // ============================================================================

    /// Encode the claims added with [`add_claim`](Self::add_claim)
    pub fn encode(&self) -> Result<String> {
        self.encoder()?
            .encode_value(&self.headers, &Value::Object(self.claims.clone()), self.signing_key())
    }

    /// Encode a whole payload object
    ///
    /// Fails with [`Error::OperationNotSupported`] if claims were also added
    /// one by one.
    pub fn encode_payload<T>(&self, payload: &T) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        if !self.claims.is_empty() {
            return Err(Error::OperationNotSupported(
                "payload object cannot be combined with discrete claims".into(),
            ));
        }
        self.encoder()?
            .encode_with_headers(&self.headers, payload, self.signing_key())
    }

    fn encoder(&self) -> Result<JwtEncoder> {
        let algorithm = self
            .algorithm
            .clone()
            .ok_or_else(|| Error::OperationInvalid("no signing algorithm configured".into()))?;
        Ok(JwtEncoder::from_shared(algorithm, self.serializer()?))
    }

    fn signing_key(&self) -> &[u8] {
        self.secrets.first().map(Vec::as_slice).unwrap_or_default()
    }

    // ============================================================================
    // Decoding
    // ============================================================================

    /// Decode a token to payload JSON text
    pub fn decode(&self, token: &str) -> Result<String> {
        self.decoder()?
            .decode(token, self.secrets.as_slice(), !self.skip_verification)
    }

    pub fn decode_to<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        self.decoder()?
            .decode_to(token, self.secrets.as_slice(), !self.skip_verification)
    }

    /// Header JSON text, without verification
    pub fn decode_header(&self, token: &str) -> Result<String> {
        JwtDecoder::from_shared(self.serializer()?).decode_header(token)
    }

    fn decoder(&self) -> Result<JwtDecoder> {
        let mut decoder = JwtDecoder::from_shared(self.serializer()?);

        let factory = match (&self.factory, &self.algorithm) {
            (Some(factory), _) => Some(factory.clone()),
            (None, Some(algorithm)) => Some(Arc::new(FixedAlgorithmFactory::from_shared(
                algorithm.clone(),
            )) as Arc<dyn AlgorithmFactory>),
            (None, None) => None,
        };
        if let Some(factory) = factory {
            decoder = decoder.with_shared_factory(factory);
        }

        let mut validator = match &self.validator {
            Some(validator) => validator.clone(),
            None => JwtValidator::default(),
        };
        if let Some(clock) = &self.clock {
            validator = validator.with_shared_clock(clock.clone());
        }

        Ok(decoder.with_validator(validator))
    }

    fn serializer(&self) -> Result<Arc<dyn JsonSerializer>> {
        self.serializer
            .clone()
            .ok_or_else(|| Error::OperationInvalid("no JSON serializer configured".into()))
    }
}

impl fmt::Debug for JwtBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtBuilder")
            .field("algorithm", &self.algorithm.as_ref().map(|a| a.id()))
            .field("secrets", &self.secrets.len())
            .field("headers", &self.headers)
            .field("claims", &self.claims)
            .field("skip_verification", &self.skip_verification)
            .finish_non_exhaustive()
    }
}
