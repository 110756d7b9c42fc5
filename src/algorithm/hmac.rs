use super::{AlgorithmId, SharedAlgorithm, SigningAlgorithm};
use crate::error::{Error, Result};

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use std::sync::Arc;

/// HS256 algorithm (HMAC with SHA-256)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS256;

/// HS384 algorithm (HMAC with SHA-384)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS384;

/// HS512 algorithm (HMAC with SHA-512)
#[derive(Debug, Clone, Copy, Default)]
pub struct HS512;

impl SigningAlgorithm for HS256 {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::HS256
    }

    fn sign(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        check_secret(key)?;
        let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(hmac_key_error)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl SigningAlgorithm for HS384 {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::HS384
    }

    fn sign(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        check_secret(key)?;
        let mut mac = Hmac::<Sha384>::new_from_slice(key).map_err(hmac_key_error)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl SigningAlgorithm for HS512 {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::HS512
    }

    fn sign(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
        check_secret(key)?;
        let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(hmac_key_error)?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Shared HMAC instance for an HMAC algorithm id
pub(crate) fn shared(id: AlgorithmId) -> Result<SharedAlgorithm> {
    match id {
        AlgorithmId::HS256 => Ok(Arc::new(HS256)),
        AlgorithmId::HS384 => Ok(Arc::new(HS384)),
        AlgorithmId::HS512 => Ok(Arc::new(HS512)),
        other => Err(Error::AlgorithmUnsupported(other.to_string())),
    }
}

fn check_secret(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::KeyEmpty { index: 0 });
    }
    Ok(())
}

fn hmac_key_error(e: hmac::digest::InvalidLength) -> Error {
    Error::KeyInvalid(format!("hmac: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64url;

    #[test]
    fn test_hs256_known_vector() {
        let signing_input = b"eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.eyJGaXJzdE5hbWUiOiJCb2IiLCJBZ2UiOjM3fQ";
        let signature = HS256.sign(b"ABC", signing_input).unwrap();
        assert_eq!(
            base64url::encode(signature),
            "cr0xw8c_HKzhFBMQrseSPGoJ0NPlRp_3BKzP96jwBdY"
        );
    }

    #[test]
    fn test_output_lengths() {
        assert_eq!(HS256.sign(b"k", b"data").unwrap().len(), 32);
        assert_eq!(HS384.sign(b"k", b"data").unwrap().len(), 48);
        assert_eq!(HS512.sign(b"k", b"data").unwrap().len(), 64);
    }

    #[test]
    fn test_different_secrets_differ() {
        let a = HS256.sign(b"secret-a", b"data").unwrap();
        let b = HS256.sign(b"secret-b", b"data").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            HS256.sign(b"", b"data"),
            Err(Error::KeyEmpty { index: 0 })
        ));
    }

    #[test]
    fn test_shared_maps_ids() {
        assert_eq!(shared(AlgorithmId::HS384).unwrap().id(), AlgorithmId::HS384);
        assert!(shared(AlgorithmId::RS256).is_err());
        assert!(HS512.as_asymmetric().is_none());
    }
}
