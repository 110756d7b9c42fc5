use super::{AlgorithmFamily, AlgorithmId, AsymmetricAlgorithm, SigningAlgorithm};
use crate::error::{Error, Result};

use aws_lc_rs::rand::SystemRandom;
use aws_lc_rs::signature::{self, KeyPair, RsaEncoding, RsaKeyPair, UnparsedPublicKey};
use std::sync::Arc;

/// RSA PKCS#1 v1.5 signature algorithm (RS256, RS384, RS512)
///
/// Holds a DER public key (SubjectPublicKeyInfo or PKCS#1 RSAPublicKey) and,
/// optionally, a private key. Without the private key the instance is
/// verify-only and `sign` fails with [`Error::OperationInvalid`].
pub struct RsaAlgorithm {
    id: AlgorithmId,
    public_key: Vec<u8>,
    key_pair: Option<Arc<RsaKeyPair>>,
}

impl RsaAlgorithm {
    /// Verify-only RSA algorithm
    pub fn new(id: AlgorithmId, public_key_der: impl Into<Vec<u8>>) -> Result<Self> {
        ensure_rsa(id)?;
        let public_key = public_key_der.into();
        if public_key.is_empty() {
            return Err(Error::KeyInvalid("rsa: public key is empty".into()));
        }
        Ok(Self {
            id,
            public_key,
            key_pair: None,
        })
    }

    /// RSA algorithm able to sign, from a PKCS#8 DER private key
    ///
    /// The public key is derived from the private key. Signing keys below
    /// 2048 bits are rejected with [`Error::KeyInvalid`], while [`RsaAlgorithm::new`]
    /// still verifies with public keys from 1024 bits up.
    pub fn with_private_key(id: AlgorithmId, pkcs8_der: &[u8]) -> Result<Self> {
        let key_pair = parse_private_key(pkcs8_der)?;
        Self::from_key_pair(id, key_pair)
    }

    pub(crate) fn from_key_pair(id: AlgorithmId, key_pair: Arc<RsaKeyPair>) -> Result<Self> {
        ensure_rsa(id)?;
        Ok(Self {
            id,
            public_key: key_pair.public_key().as_ref().to_vec(),
            key_pair: Some(key_pair),
        })
    }

    /// DER public key used for verification
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    // 1024-bit keys still verify; aws-lc-rs gates them behind the legacy statics
    fn verification_algorithm(&self) -> &'static dyn signature::VerificationAlgorithm {
        match self.id {
            AlgorithmId::RS384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            AlgorithmId::RS512 => &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY,
            _ => &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY,
        }
    }

    fn padding(&self) -> &'static dyn RsaEncoding {
        match self.id {
            AlgorithmId::RS384 => &signature::RSA_PKCS1_SHA384,
            AlgorithmId::RS512 => &signature::RSA_PKCS1_SHA512,
            _ => &signature::RSA_PKCS1_SHA256,
        }
    }
}

impl SigningAlgorithm for RsaAlgorithm {
    fn id(&self) -> AlgorithmId {
        self.id
    }

    fn sign(&self, _key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        let key_pair = self.key_pair.as_ref().ok_or_else(|| {
            Error::OperationInvalid(format!("{}: signing requires a private key", self.id))
        })?;

        let rng = SystemRandom::new();
        let mut signature = vec![0u8; key_pair.public_modulus_len()];
        key_pair
            .sign(self.padding(), &rng, data, &mut signature)
            .map_err(|_| Error::KeyInvalid(format!("{}: signing failed", self.id)))?;
        Ok(signature)
    }

    fn as_asymmetric(&self) -> Option<&dyn AsymmetricAlgorithm> {
        Some(self)
    }
}

impl AsymmetricAlgorithm for RsaAlgorithm {
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        UnparsedPublicKey::new(self.verification_algorithm(), &self.public_key)
            .verify(data, signature)
            .is_ok()
    }

    fn can_sign(&self) -> bool {
        self.key_pair.is_some()
    }
}

impl std::fmt::Debug for RsaAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaAlgorithm")
            .field("id", &self.id)
            .field("can_sign", &self.key_pair.is_some())
            .finish()
    }
}

pub(crate) fn parse_private_key(pkcs8_der: &[u8]) -> Result<Arc<RsaKeyPair>> {
    RsaKeyPair::from_pkcs8(pkcs8_der)
        .map(Arc::new)
        .map_err(|e| Error::KeyInvalid(format!("rsa: private key rejected: {e}")))
}

fn ensure_rsa(id: AlgorithmId) -> Result<()> {
    if id.family() == AlgorithmFamily::Rsa {
        Ok(())
    } else {
        Err(Error::KeyTypeMismatch {
            algorithm: id.to_string(),
            expected_key_type: id.family().key_type().into(),
            actual_key_type: "RSA key".into(),
        })
    }
}
