//! # jwtcraft - Encode, Decode and Verify JSON Web Tokens
//!
//! **jwtcraft** produces and consumes compact JWS tokens
//! (`b64u(header).b64u(payload).b64u(signature)`) with HMAC, RSA PKCS#1 and
//! ECDSA signatures, and validates the registered time claims.
//!
//! ## Overview
//!
//! Encoding and decoding are split into two small types. [`JwtEncoder`] owns
//! one signing algorithm. [`JwtDecoder`] resolves the verification algorithm
//! per token through an [`AlgorithmFactory`], which is scoped to a key
//! capability: an HMAC factory never yields RSA, an RSA factory never yields
//! HMAC. The token's `alg` header only selects within that scope, which rules
//! out algorithm confusion. [`JwtBuilder`] wraps both for one-off use.
//!
//! JSON goes through an injected [`JsonSerializer`]; [`SerdeJsonSerializer`]
//! is the stock implementation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use jwtcraft::*;
//! use jwtcraft::algorithm::hmac::HS256;
//!
//! let encoder = JwtEncoder::new(HS256, SerdeJsonSerializer);
//! let token = encoder.encode(&serde_json::json!({"sub": "user-1"}), b"secret")?;
//!
//! let decoder = JwtDecoder::new(SerdeJsonSerializer)
//!     .with_factory(HmacAlgorithmFactory::new())
//!     .with_validator(JwtValidator::default());
//! let json = decoder.decode(&token, &[b"secret"], true)?;
//! ```
//!
//! ## Decoding Flow
//!
//! ```text
//! token string
//!     │ JwtParts::parse       (size, exactly three segments)
//!     ▼
//! header + payload JSON       (Base64URL, size limits)
//!     │ AlgorithmFactory::create
//!     ▼
//! signature check             (asymmetric verify, or HMAC over every key)
//!     │ JwtValidator::validate
//!     ▼
//! payload JSON / T
//! ```
//!
//! ## Algorithm Support
//!
//! - **HMAC**: HS256, HS384, HS512
//! - **RSA PKCS#1 v1.5**: RS256, RS384, RS512 (verifies 1024 to 8192 bit keys,
//!   signs with 2048 bits or more)
//! - **ECDSA**: ES256, ES384, ES512 (P-256, P-384, P-521)
//!
//! RSA and ECDSA run on [`aws-lc-rs`](https://crates.io/crates/aws-lc-rs).
//! Public keys can come from DER or from a JWK Set ([`JwksAlgorithmFactory`]).
//!
//! ## Security
//!
//! ### "none" Algorithm Rejection
//!
//! `none` is parsed but cannot sign. A token declaring it fails verified
//! decoding with [`Error::SignatureInvalid`].
//!
//! ### Timing Attack Protection
//!
//! HMAC signatures are compared with [`constant_time_eq`](https://crates.io/crates/constant_time_eq)
//! once the lengths are known to match.
//!
//! ### Resource Limits
//!
//! Token, segment, JWK Set and key component sizes are bounded; see [`limits`].
//!
//! ## References
//!
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515) - JSON Web Signature (JWS)
//! - [RFC 7517](https://datatracker.ietf.org/doc/html/rfc7517) - JSON Web Key (JWK)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519) - JSON Web Token (JWT)
//! - [RFC 8725](https://datatracker.ietf.org/doc/html/rfc8725) - JSON Web Signature Best Practices

// Core modules
pub mod error;
pub mod limits;
pub mod serializer;
pub mod utils;

// Algorithm system
pub mod algorithm;
pub mod factory;
pub mod jwks;

// Token structure and claims
pub mod clock;
pub mod token;
pub mod validator;

// Encoding and decoding
pub mod builder;
pub mod decoder;
pub mod encoder;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use builder::{JwtBuilder, RegisteredClaim};
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;

pub use clock::{Clock, FixedClock, SystemClock};
pub use serializer::{JsonSerializer, SerdeJsonSerializer};
pub use validator::{JwtValidator, ValidationParameters};

pub use algorithm::{
    AlgorithmFamily, AlgorithmId, AlgorithmPolicy, AsymmetricAlgorithm, SharedAlgorithm,
    SigningAlgorithm,
};
pub use factory::{
    AlgorithmContext, AlgorithmFactory, EcdsaAlgorithmFactory, FixedAlgorithmFactory,
    HmacAlgorithmFactory, NoneAlgorithmFactory, RsaAlgorithmFactory,
};
pub use jwks::{Jwk, JwkSet, JwksAlgorithmFactory};

pub use error::{Error, Result};
pub use token::{JwtHeader, JwtParts};
