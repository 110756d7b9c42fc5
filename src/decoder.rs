//! Token decoding and verification
//!
//! ```text
//! token ─▶ JwtParts::parse ─▶ header JSON ─▶ payload JSON
//!            │ verify requested
//!            ▼
//!          AlgorithmFactory::create(header)
//!            ├─ asymmetric: verify(signing_input, signature bytes)
//!            └─ symmetric:  sign with every candidate key, compare
//!            ▼
//!          JwtValidator::validate(payload)
//! ```
//!
//! Header-only and unverified decoding need neither a factory nor a
//! validator.

use crate::algorithm::{AlgorithmId, AsymmetricAlgorithm, SharedAlgorithm};
use crate::error::{Error, Result};
use crate::factory::{AlgorithmContext, AlgorithmFactory};
use crate::limits::{MAX_DECODED_HEADER_SIZE, MAX_DECODED_PAYLOAD_SIZE, MAX_DECODED_SIGNATURE_SIZE};
use crate::serializer::JsonSerializer;
use crate::token::{JwtHeader, JwtParts};
use crate::utils::base64url;
use crate::validator::JwtValidator;

use constant_time_eq::constant_time_eq;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decodes and verifies compact JWS tokens
#[derive(Clone)]
pub struct JwtDecoder {
    serializer: Arc<dyn JsonSerializer>,
    factory: Option<Arc<dyn AlgorithmFactory>>,
    validator: Option<JwtValidator>,
}

impl JwtDecoder {
    /// Decoder able to read headers and unverified payloads
    ///
    /// Verified decoding additionally needs [`with_factory`](Self::with_factory)
    /// and [`with_validator`](Self::with_validator).
    pub fn new(serializer: impl JsonSerializer + 'static) -> Self {
        Self::from_shared(Arc::new(serializer))
    }

    pub fn from_shared(serializer: Arc<dyn JsonSerializer>) -> Self {
        Self {
            serializer,
            factory: None,
            validator: None,
        }
    }

    pub fn with_factory(self, factory: impl AlgorithmFactory + 'static) -> Self {
        self.with_shared_factory(Arc::new(factory))
    }

    pub fn with_shared_factory(mut self, factory: Arc<dyn AlgorithmFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_validator(mut self, validator: JwtValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    // ============================================================================
    // Header access
    // ============================================================================

    /// Header JSON text, without any verification
    pub fn decode_header(&self, token: &str) -> Result<String> {
        let parts = JwtParts::parse(token)?;
        base64url::decode_string(parts.header(), MAX_DECODED_HEADER_SIZE)
    }

    /// Header deserialized into a caller type, without any verification
    pub fn decode_header_to<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let json = self.decode_header(token)?;
        self.deserialize_to(&json)
    }

    /// Header as [`JwtHeader`], without any verification
    pub fn decode_header_typed(&self, token: &str) -> Result<JwtHeader> {
        self.decode_header_to(token)
    }

    // ============================================================================
    // Payload access
    // ============================================================================

    /// Payload JSON text, without signature or claim checks
    pub fn decode_unverified(&self, token: &str) -> Result<String> {
        let (_, _, payload) = self.decode_segments(token)?;
        Ok(payload)
    }

    /// Decode a token and return the payload JSON text
    ///
    /// With `verify` set, the signature is checked (for symmetric
    /// algorithms against every key in `keys`, succeeding if any matches)
    /// and then the claims are validated.
    pub fn decode<K: AsRef<[u8]>>(&self, token: &str, keys: &[K], verify: bool) -> Result<String> {
        let (parts, header, payload) = self.decode_segments(token)?;

        if verify {
            let factory = self.factory.as_ref().ok_or_else(|| {
                Error::OperationInvalid("signature verification requires an algorithm factory".into())
            })?;
            let validator = self.validator.as_ref().ok_or_else(|| {
                Error::OperationInvalid("signature verification requires a validator".into())
            })?;

            if validator.parameters().validate_signature {
                let algorithm = factory.create(&AlgorithmContext::new(&header, &parts))?;
                debug!(algorithm = algorithm.name(), kid = header.key_id(), "resolved signing algorithm");
                verify_signature(&algorithm, &parts, keys)?;
                debug!(algorithm = algorithm.name(), "signature verified");
            }

            if validator.has_claim_checks() {
                match self.serializer.deserialize(&payload)? {
                    Value::Object(claims) => validator.validate(&claims)?,
                    _ => {
                        return Err(Error::FormatInvalidJson(
                            "payload is not a JSON object".into(),
                        ));
                    }
                }
            }
        }

        Ok(payload)
    }

    /// Decode with a single key
    pub fn decode_with_key(&self, token: &str, key: &[u8], verify: bool) -> Result<String> {
        self.decode(token, &[key], verify)
    }

    /// Decode and deserialize the payload into a caller type
    pub fn decode_to<T, K>(&self, token: &str, keys: &[K], verify: bool) -> Result<T>
    where
        T: DeserializeOwned,
        K: AsRef<[u8]>,
    {
        let json = self.decode(token, keys, verify)?;
        self.deserialize_to(&json)
    }

    fn decode_segments(&self, token: &str) -> Result<(JwtParts, JwtHeader, String)> {
        let parts = JwtParts::parse(token)?;
        let header_json = base64url::decode_string(parts.header(), MAX_DECODED_HEADER_SIZE)?;
        let header: JwtHeader = self.deserialize_to(&header_json)?;
        let payload = base64url::decode_string(parts.payload(), MAX_DECODED_PAYLOAD_SIZE)?;
        Ok((parts, header, payload))
    }

    fn deserialize_to<T: DeserializeOwned>(&self, json: &str) -> Result<T> {
        let value = self.serializer.deserialize(json)?;
        serde_json::from_value(value).map_err(|e| Error::FormatInvalidJson(e.to_string()))
    }
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("has_factory", &self.factory.is_some())
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

fn verify_signature<K: AsRef<[u8]>>(
    algorithm: &SharedAlgorithm,
    parts: &JwtParts,
    keys: &[K],
) -> Result<()> {
    // an unsecured token is a signature failure whatever the key set holds
    if algorithm.id() == AlgorithmId::None {
        warn!("unsecured token rejected");
        return Err(Error::SignatureInvalid);
    }

    let signing_input = parts.signing_input();

    if let Some(asymmetric) = algorithm.as_asymmetric() {
        return verify_asymmetric(asymmetric, signing_input.as_bytes(), parts.signature());
    }

    if keys.is_empty() {
        return Err(Error::KeySetEmpty);
    }
    if let Some(index) = keys.iter().position(|k| k.as_ref().is_empty()) {
        return Err(Error::KeyEmpty { index });
    }

    let received = parts.signature();
    let mut expected = Vec::with_capacity(keys.len());
    let mut matched = false;
    for key in keys {
        let candidate = base64url::encode(algorithm.sign(key.as_ref(), signing_input.as_bytes())?);
        // unequal length is a definite mismatch; equal length compares in constant time
        if candidate.len() == received.len()
            && constant_time_eq(candidate.as_bytes(), received.as_bytes())
        {
            matched = true;
        }
        expected.push(candidate);
    }

    if matched {
        Ok(())
    } else {
        warn!(
            algorithm = algorithm.name(),
            candidates = keys.len(),
            "signature mismatch"
        );
        Err(Error::SignatureMismatch {
            expected,
            received: received.to_string(),
        })
    }
}

fn verify_asymmetric(
    algorithm: &dyn AsymmetricAlgorithm,
    signing_input: &[u8],
    signature: &str,
) -> Result<()> {
    let signature = base64url::decode_bytes(signature, MAX_DECODED_SIGNATURE_SIZE)
        .map_err(|_| Error::SignatureInvalid)?;

    if algorithm.verify(signing_input, &signature) {
        Ok(())
    } else {
        warn!(algorithm = algorithm.name(), "signature verification failed");
        Err(Error::SignatureInvalid)
    }
}
