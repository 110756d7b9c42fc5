//! DER encoding for RSA public keys taken from JWK `n`/`e` components
//!
//! Uses the RustCrypto `spki` and `der` crates to produce the
//! SubjectPublicKeyInfo form that aws-lc-rs accepts.

use crate::error::{Error, Result};
use der::{Encode, Sequence, asn1::UintRef};
use spki::{AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned};

/// RSA modulus upper bound (bytes); 65536-bit keys are far past practical use
const MAX_RSA_MODULUS_SIZE: usize = 8192;

const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

fn jwk_error(operation: &str, details: impl std::fmt::Display) -> Error {
    Error::KeyInvalid(format!("jwk: {operation}: {details}"))
}

/// RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }
#[derive(Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

/// Build DER-encoded SubjectPublicKeyInfo from RSA modulus (n) and exponent (e) bytes
pub(crate) fn rsa_spki_from_n_e(n: &[u8], e: &[u8]) -> Result<Vec<u8>> {
    use der::asn1::BitString;

    if n.is_empty() || e.is_empty() {
        return Err(jwk_error("rsa key missing n or e", "empty component"));
    }

    if n.len() > MAX_RSA_MODULUS_SIZE {
        return Err(jwk_error(
            "RSA modulus too large",
            format!("{} bytes (maximum: {MAX_RSA_MODULUS_SIZE} bytes)", n.len()),
        ));
    }

    let rsa_pubkey = RsaPublicKey {
        modulus: UintRef::new(n).map_err(|e| jwk_error("failed to encode RSA modulus", e))?,
        public_exponent: UintRef::new(e)
            .map_err(|e| jwk_error("failed to encode RSA exponent", e))?,
    };

    let rsa_pubkey_der = rsa_pubkey
        .to_der()
        .map_err(|e| jwk_error("failed to encode RSA public key", e))?;

    let algorithm = AlgorithmIdentifierOwned {
        oid: RSA_ENCRYPTION_OID,
        parameters: Some(der::asn1::AnyRef::NULL.into()),
    };

    let subject_public_key = BitString::new(0, rsa_pubkey_der)
        .map_err(|e| jwk_error("failed to create bit string", e))?;

    SubjectPublicKeyInfoOwned {
        algorithm,
        subject_public_key,
    }
    .to_der()
    .map_err(|e| jwk_error("failed to encode SPKI", e))
}
