use super::{AlgorithmId, AsymmetricAlgorithm, SigningAlgorithm};
use crate::error::{Error, Result};

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{self, EcdsaKeyPair, EcdsaSigningAlgorithm, KeyPair, UnparsedPublicKey};
use std::sync::Arc;

/// Elliptic curves used by the ES* algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaCurve {
    P256,
    P384,
    P521,
}

impl EcdsaCurve {
    /// Curve required by an ECDSA algorithm id
    pub fn for_algorithm(id: AlgorithmId) -> Result<Self> {
        match id {
            AlgorithmId::ES256 => Ok(EcdsaCurve::P256),
            AlgorithmId::ES384 => Ok(EcdsaCurve::P384),
            AlgorithmId::ES512 => Ok(EcdsaCurve::P521),
            other => Err(Error::KeyTypeMismatch {
                algorithm: other.to_string(),
                expected_key_type: other.family().key_type().into(),
                actual_key_type: "EC key".into(),
            }),
        }
    }

    /// Curve name as used in JWK `crv`
    pub const fn jwk_name(&self) -> &'static str {
        match self {
            EcdsaCurve::P256 => "P-256",
            EcdsaCurve::P384 => "P-384",
            EcdsaCurve::P521 => "P-521",
        }
    }

    /// Field element width in bytes; also the width of R and S
    pub const fn coordinate_len(&self) -> usize {
        match self {
            EcdsaCurve::P256 => 32,
            EcdsaCurve::P384 => 48,
            EcdsaCurve::P521 => 66,
        }
    }

    pub const fn algorithm(&self) -> AlgorithmId {
        match self {
            EcdsaCurve::P256 => AlgorithmId::ES256,
            EcdsaCurve::P384 => AlgorithmId::ES384,
            EcdsaCurve::P521 => AlgorithmId::ES512,
        }
    }

    fn signing_algorithm(&self) -> &'static EcdsaSigningAlgorithm {
        match self {
            EcdsaCurve::P256 => &signature::ECDSA_P256_SHA256_FIXED_SIGNING,
            EcdsaCurve::P384 => &signature::ECDSA_P384_SHA384_FIXED_SIGNING,
            EcdsaCurve::P521 => &signature::ECDSA_P521_SHA512_FIXED_SIGNING,
        }
    }

    /// JWT ECDSA signatures are fixed-width R||S (RFC 7518 §3.4), not ASN.1
    fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            EcdsaCurve::P256 => &signature::ECDSA_P256_SHA256_FIXED,
            EcdsaCurve::P384 => &signature::ECDSA_P384_SHA384_FIXED,
            EcdsaCurve::P521 => &signature::ECDSA_P521_SHA512_FIXED,
        }
    }

    const ALL: [EcdsaCurve; 3] = [EcdsaCurve::P256, EcdsaCurve::P384, EcdsaCurve::P521];
}

/// ECDSA signature algorithm (ES256, ES384, ES512)
///
/// The public key is an uncompressed SEC1 point (`04 || x || y`) or a DER
/// SubjectPublicKeyInfo. A PKCS#8 private key enables signing.
pub struct EcdsaAlgorithm {
    curve: EcdsaCurve,
    public_key: Vec<u8>,
    key_pair: Option<Arc<EcdsaKeyPair>>,
}

impl EcdsaAlgorithm {
    /// Verify-only ECDSA algorithm
    pub fn new(id: AlgorithmId, public_key: impl Into<Vec<u8>>) -> Result<Self> {
        let curve = EcdsaCurve::for_algorithm(id)?;
        let public_key = public_key.into();
        check_public_key(id, curve, &public_key)?;
        Ok(Self {
            curve,
            public_key,
            key_pair: None,
        })
    }

    /// Verify-only ECDSA algorithm from affine coordinates
    pub fn from_coordinates(id: AlgorithmId, x: &[u8], y: &[u8]) -> Result<Self> {
        let curve = EcdsaCurve::for_algorithm(id)?;
        let width = curve.coordinate_len();
        if x.len() != width || y.len() != width {
            return Err(Error::KeyInvalid(format!(
                "{id}: coordinates must be {width} bytes, got x={} y={}",
                x.len(),
                y.len()
            )));
        }

        let mut point = Vec::with_capacity(1 + 2 * width);
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        Self::new(id, point)
    }

    /// ECDSA algorithm able to sign, from a PKCS#8 DER private key
    ///
    /// A key on a different curve than `id` requires fails with
    /// [`Error::KeyTypeMismatch`].
    pub fn with_private_key(id: AlgorithmId, pkcs8_der: &[u8]) -> Result<Self> {
        let curve = EcdsaCurve::for_algorithm(id)?;
        let key_pair = match EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), pkcs8_der) {
            Ok(key_pair) => key_pair,
            Err(e) => {
                let actual = EcdsaCurve::ALL.into_iter().find(|other| {
                    *other != curve
                        && EcdsaKeyPair::from_pkcs8(other.signing_algorithm(), pkcs8_der).is_ok()
                });
                return Err(match actual {
                    Some(actual) => curve_mismatch(id, curve, actual),
                    None => Error::KeyInvalid(format!("{id}: private key rejected: {e}")),
                });
            }
        };

        Ok(Self {
            curve,
            public_key: key_pair.public_key().as_ref().to_vec(),
            key_pair: Some(Arc::new(key_pair)),
        })
    }

    pub fn curve(&self) -> EcdsaCurve {
        self.curve
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

impl SigningAlgorithm for EcdsaAlgorithm {
    fn id(&self) -> AlgorithmId {
        self.curve.algorithm()
    }

    fn sign(&self, _key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let key_pair = self.key_pair.as_ref().ok_or_else(|| {
            Error::OperationInvalid(format!("{}: signing requires a private key", self.id()))
        })?;

        let rng = SystemRandom::new();
        let signature = key_pair
            .sign(&rng, data)
            .map_err(|_| Error::KeyInvalid(format!("{}: signing failed", self.id())))?;
        Ok(signature.as_ref().to_vec())
    }

    fn as_asymmetric(&self) -> Option<&dyn AsymmetricAlgorithm> {
        Some(self)
    }
}

impl AsymmetricAlgorithm for EcdsaAlgorithm {
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        if signature.len() != 2 * self.curve.coordinate_len() {
            return false;
        }
        UnparsedPublicKey::new(self.curve.verification_algorithm(), &self.public_key)
            .verify(data, signature)
            .is_ok()
    }

    fn can_sign(&self) -> bool {
        self.key_pair.is_some()
    }
}

impl std::fmt::Debug for EcdsaAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaAlgorithm")
            .field("curve", &self.curve)
            .field("can_sign", &self.key_pair.is_some())
            .finish()
    }
}

fn check_public_key(id: AlgorithmId, curve: EcdsaCurve, public_key: &[u8]) -> Result<()> {
    match public_key.first() {
        None => Err(Error::KeyInvalid(format!("{id}: public key is empty"))),
        // uncompressed point: length pins the curve
        Some(0x04) => {
            let width = (public_key.len() - 1) / 2;
            if width == curve.coordinate_len() && public_key.len() % 2 == 1 {
                return Ok(());
            }
            match EcdsaCurve::ALL
                .into_iter()
                .find(|c| 1 + 2 * c.coordinate_len() == public_key.len())
            {
                Some(actual) => Err(curve_mismatch(id, curve, actual)),
                None => Err(Error::KeyInvalid(format!(
                    "{id}: malformed uncompressed point ({} bytes)",
                    public_key.len()
                ))),
            }
        }
        // DER SubjectPublicKeyInfo, checked by the backend at verification
        Some(0x30) => Ok(()),
        Some(tag) => Err(Error::KeyInvalid(format!(
            "{id}: unsupported public key encoding (leading byte {tag:#04x})"
        ))),
    }
}

fn curve_mismatch(id: AlgorithmId, expected: EcdsaCurve, actual: EcdsaCurve) -> Error {
    Error::KeyTypeMismatch {
        algorithm: id.to_string(),
        expected_key_type: expected.jwk_name().into(),
        actual_key_type: actual.jwk_name().into(),
    }
}
