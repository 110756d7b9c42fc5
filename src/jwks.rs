//! JSON Web Key Set (JWKS) backed algorithm selection
//!
//! The set is handed over as an already-fetched JSON document. Tokens pick
//! their key through the header `kid`; the key's `kty`/`crv` must fit the
//! header `alg`, and only RSA and ECDSA keys are honoured.

use crate::algorithm::ecdsa::{EcdsaAlgorithm, EcdsaCurve};
use crate::algorithm::rsa::RsaAlgorithm;
use crate::algorithm::{AlgorithmFamily, AlgorithmId, AlgorithmPolicy, SharedAlgorithm};
use crate::error::{Error, Result};
use crate::factory::{AlgorithmContext, AlgorithmFactory};
use crate::limits::{
    MAX_JWK_COORDINATE_SIZE, MAX_JWK_E_SIZE, MAX_JWK_N_SIZE, MAX_JWK_SET_SIZE,
    MAX_JWKS_DOCUMENT_SIZE, MAX_KID_LENGTH,
};
use crate::utils::{base64url, der};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// JSON Web Key (RFC 7517)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "EC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    /// Key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Intended algorithm; when present it must equal the token `alg`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Key use; when present it must be "sig"
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    // RSA fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    // EC fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// Build a verify-only algorithm for `id` from this key
    pub fn to_algorithm(&self, id: AlgorithmId) -> Result<SharedAlgorithm> {
        self.validate_structure(id)?;

        match id.family() {
            AlgorithmFamily::Rsa => Ok(Arc::new(self.to_rsa(id)?)),
            AlgorithmFamily::Ecdsa => Ok(Arc::new(self.to_ecdsa(id)?)),
            _ => Err(Error::AlgorithmUnsupported(id.to_string())),
        }
    }

    fn validate_structure(&self, id: AlgorithmId) -> Result<()> {
        let expected_kty = match id.family() {
            AlgorithmFamily::Rsa => "RSA",
            AlgorithmFamily::Ecdsa => "EC",
            _ => return Err(Error::AlgorithmUnsupported(id.to_string())),
        };

        match self.kty.as_deref() {
            Some(kty) if kty == expected_kty => {}
            Some(kty) => {
                return Err(Error::KeyTypeMismatch {
                    algorithm: id.to_string(),
                    expected_key_type: expected_kty.into(),
                    actual_key_type: kty.into(),
                });
            }
            None => return Err(Error::KeyInvalid("jwk: missing key type (kty)".into())),
        }

        if let Some(use_val) = &self.key_use {
            if use_val != "sig" {
                return Err(Error::KeyInvalid(format!(
                    "jwk: key use mismatch: expected 'sig', found '{use_val}'"
                )));
            }
        }

        if let Some(jwk_alg) = &self.alg {
            if jwk_alg != id.as_str() {
                return Err(Error::AlgorithmNotAllowed {
                    found: id.to_string(),
                    allowed: vec![jwk_alg.clone()],
                });
            }
        }

        Ok(())
    }

    fn to_rsa(&self, id: AlgorithmId) -> Result<RsaAlgorithm> {
        let n = required_component(self.n.as_deref(), "n", MAX_JWK_N_SIZE)?;
        let e = required_component(self.e.as_deref(), "e", MAX_JWK_E_SIZE)?;
        RsaAlgorithm::new(id, der::rsa_spki_from_n_e(&n, &e)?)
    }

    fn to_ecdsa(&self, id: AlgorithmId) -> Result<EcdsaAlgorithm> {
        let curve = EcdsaCurve::for_algorithm(id)?;
        match self.crv.as_deref() {
            Some(crv) if crv == curve.jwk_name() => {}
            Some(crv) => {
                return Err(Error::KeyTypeMismatch {
                    algorithm: id.to_string(),
                    expected_key_type: curve.jwk_name().into(),
                    actual_key_type: crv.into(),
                });
            }
            None => return Err(Error::KeyInvalid("jwk: missing curve (crv)".into())),
        }

        let x = required_component(self.x.as_deref(), "x", MAX_JWK_COORDINATE_SIZE)?;
        let y = required_component(self.y.as_deref(), "y", MAX_JWK_COORDINATE_SIZE)?;
        EcdsaAlgorithm::from_coordinates(id, &x, &y)
    }
}

/// Decode a Base64URL key component, bounding both encoded and decoded size
fn required_component(value: Option<&str>, field: &str, max_encoded: usize) -> Result<Vec<u8>> {
    let value =
        value.ok_or_else(|| Error::KeyInvalid(format!("jwk: missing '{field}' component")))?;
    if value.len() > max_encoded {
        return Err(Error::KeyInvalid(format!(
            "jwk: '{field}' too large: {} bytes (maximum: {max_encoded} bytes)",
            value.len()
        )));
    }
    base64url::decode_bytes(value, max_encoded * 3 / 4)
        .map_err(|e| Error::KeyInvalid(format!("jwk: failed to decode '{field}': {e}")))
}

/// JSON Web Key Set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Parse a JWKS document
    pub fn from_json(json: &str) -> Result<Self> {
        if json.len() > MAX_JWKS_DOCUMENT_SIZE {
            return Err(Error::KeyInvalid(format!(
                "jwks: document too large: {} bytes (maximum: {MAX_JWKS_DOCUMENT_SIZE} bytes)",
                json.len()
            )));
        }

        let set: JwkSet = serde_json::from_str(json)
            .map_err(|e| Error::FormatInvalidJson(format!("jwks: {e}")))?;

        if set.keys.len() > MAX_JWK_SET_SIZE {
            return Err(Error::KeyInvalid(format!(
                "jwks: too many keys: {} (maximum: {MAX_JWK_SET_SIZE})",
                set.keys.len()
            )));
        }

        Ok(set)
    }

    /// Find the single key with this `kid`
    pub fn find(&self, kid: &str) -> Result<&Jwk> {
        let mut matches = self.keys.iter().filter(|k| k.kid.as_deref() == Some(kid));
        match (matches.next(), matches.next()) {
            (Some(jwk), None) => Ok(jwk),
            (None, _) => Err(Error::KeyIdUnknown(kid.to_string())),
            (Some(_), Some(_)) => Err(Error::KeyInvalid(format!(
                "jwks: multiple keys share kid '{kid}'"
            ))),
        }
    }
}

/// Factory resolving RSA/ECDSA algorithms from a key set by `kid`
#[derive(Debug, Clone)]
pub struct JwksAlgorithmFactory {
    keys: JwkSet,
    policy: Option<AlgorithmPolicy>,
}

impl JwksAlgorithmFactory {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys, policy: None }
    }

    /// Parse the JWKS document and build the factory
    pub fn from_json(json: &str) -> Result<Self> {
        JwkSet::from_json(json).map(Self::new)
    }

    /// Restrict accepted algorithms (default: all RSA and ECDSA)
    pub fn with_policy(mut self, policy: AlgorithmPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn keys(&self) -> &JwkSet {
        &self.keys
    }
}

impl AlgorithmFactory for JwksAlgorithmFactory {
    fn create(&self, context: &AlgorithmContext<'_>) -> Result<SharedAlgorithm> {
        let id = AlgorithmId::from_str(context.algorithm())?;
        if !id.is_asymmetric() {
            return Err(Error::AlgorithmUnsupported(id.to_string()));
        }
        if let Some(policy) = &self.policy {
            policy.validate(&id)?;
        }

        let kid = context.header().key_id().ok_or(Error::KeyIdMissing)?;
        if kid.len() > MAX_KID_LENGTH {
            return Err(Error::KeyIdUnknown(format!(
                "<{} byte kid exceeds {MAX_KID_LENGTH}>",
                kid.len()
            )));
        }

        let jwk = self.keys.find(kid)?;
        debug!(kid, algorithm = %id, "resolved key from JWKS");
        jwk.to_algorithm(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::SigningAlgorithm;
    use crate::token::{JwtHeader, JwtParts};
    use aws_lc_rs::rand::SystemRandom;
    use aws_lc_rs::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};

    fn create(factory: &JwksAlgorithmFactory, alg: &str, kid: Option<&str>) -> Result<SharedAlgorithm> {
        let header = JwtHeader {
            alg: alg.into(),
            kid: kid.map(Into::into),
            ..JwtHeader::default()
        };
        let parts = JwtParts::parse("a.b.c").unwrap();
        factory.create(&AlgorithmContext::new(&header, &parts))
    }

    fn ec_signer() -> EcdsaAlgorithm {
        let pkcs8 =
            EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &SystemRandom::new())
                .expect("Failed to generate key");
        EcdsaAlgorithm::with_private_key(AlgorithmId::ES256, pkcs8.as_ref()).unwrap()
    }

    fn ec_jwk(kid: &str, signer: &EcdsaAlgorithm) -> Jwk {
        let point = signer.public_key();
        Jwk {
            kty: Some("EC".into()),
            kid: Some(kid.into()),
            crv: Some("P-256".into()),
            x: Some(base64url::encode(&point[1..33])),
            y: Some(base64url::encode(&point[33..])),
            ..Jwk::default()
        }
    }

    #[test]
    fn test_parse_jwks_document() {
        let set = JwkSet::from_json(
            r#"{"keys":[
                {"kty":"RSA","kid":"k1","use":"sig","n":"AQAB","e":"AQAB"},
                {"kty":"EC","kid":"k2","crv":"P-256","x":"xx","y":"yy"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(set.keys.len(), 2);
        assert_eq!(set.keys[0].key_use.as_deref(), Some("sig"));
        assert_eq!(set.find("k2").unwrap().crv.as_deref(), Some("P-256"));
        assert!(matches!(set.find("k3"), Err(Error::KeyIdUnknown(kid)) if kid == "k3"));
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            JwkSet::from_json("{ invalid json }"),
            Err(Error::FormatInvalidJson(_))
        ));
        let oversized = "a".repeat(MAX_JWKS_DOCUMENT_SIZE + 1);
        assert!(matches!(
            JwkSet::from_json(&oversized),
            Err(Error::KeyInvalid(_))
        ));
    }

    #[test]
    fn test_duplicate_kid_is_ambiguous() {
        let set = JwkSet {
            keys: vec![
                Jwk {
                    kid: Some("dup".into()),
                    ..Jwk::default()
                },
                Jwk {
                    kid: Some("dup".into()),
                    ..Jwk::default()
                },
            ],
        };
        assert!(matches!(set.find("dup"), Err(Error::KeyInvalid(_))));
    }

    #[test]
    fn test_ec_key_verifies_signature() {
        let signer = ec_signer();
        let signature = signer.sign(&[], b"header.payload").unwrap();
        let factory = JwksAlgorithmFactory::new(JwkSet {
            keys: vec![ec_jwk("ec-1", &signer)],
        });

        let algorithm = create(&factory, "ES256", Some("ec-1")).unwrap();
        let verifier = algorithm.as_asymmetric().unwrap();
        assert!(verifier.verify(b"header.payload", &signature));
        assert!(!verifier.can_sign());
    }

    #[test]
    fn test_rsa_key_verifies_signature() {
        use ::rsa::traits::PublicKeyParts;
        use ::rsa::{RsaPrivateKey, pkcs8::EncodePrivateKey};

        let private_key =
            RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("Failed to generate key");
        let pkcs8 = private_key.to_pkcs8_der().expect("Failed to serialize to PKCS#8");
        let signer = RsaAlgorithm::with_private_key(AlgorithmId::RS256, pkcs8.as_bytes()).unwrap();
        let signature = signer.sign(&[], b"header.payload").unwrap();

        let jwk = Jwk {
            kty: Some("RSA".into()),
            kid: Some("rsa-1".into()),
            alg: Some("RS256".into()),
            n: Some(base64url::encode(private_key.n().to_bytes_be())),
            e: Some(base64url::encode(private_key.e().to_bytes_be())),
            ..Jwk::default()
        };
        let factory = JwksAlgorithmFactory::new(JwkSet { keys: vec![jwk] });

        let algorithm = create(&factory, "RS256", Some("rsa-1")).unwrap();
        assert!(algorithm.as_asymmetric().unwrap().verify(b"header.payload", &signature));

        assert!(matches!(
            create(&factory, "RS512", Some("rsa-1")),
            Err(Error::AlgorithmNotAllowed { .. })
        ));
    }

    #[test]
    fn test_kid_errors() {
        let signer = ec_signer();
        let factory = JwksAlgorithmFactory::new(JwkSet {
            keys: vec![ec_jwk("ec-1", &signer)],
        });

        assert!(matches!(
            create(&factory, "ES256", None),
            Err(Error::KeyIdMissing)
        ));
        assert!(matches!(
            create(&factory, "ES256", Some("other")),
            Err(Error::KeyIdUnknown(_))
        ));
    }

    #[test]
    fn test_key_type_and_curve_must_match_header() {
        let signer = ec_signer();
        let factory = JwksAlgorithmFactory::new(JwkSet {
            keys: vec![ec_jwk("ec-1", &signer)],
        });

        assert!(matches!(
            create(&factory, "RS256", Some("ec-1")),
            Err(Error::KeyTypeMismatch { .. })
        ));
        assert!(matches!(
            create(&factory, "ES384", Some("ec-1")),
            Err(Error::KeyTypeMismatch { .. })
        ));
        assert!(matches!(
            create(&factory, "HS256", Some("ec-1")),
            Err(Error::AlgorithmUnsupported(_))
        ));
        assert!(matches!(
            create(&factory, "none", Some("ec-1")),
            Err(Error::AlgorithmUnsupported(_))
        ));
    }

    #[test]
    fn test_encryption_key_rejected() {
        let signer = ec_signer();
        let mut jwk = ec_jwk("ec-1", &signer);
        jwk.key_use = Some("enc".into());
        assert!(matches!(
            jwk.to_algorithm(AlgorithmId::ES256),
            Err(Error::KeyInvalid(msg)) if msg.contains("key use")
        ));
    }
}
