use super::AlgorithmId;
use crate::error::Result;
use std::sync::Arc;

/// Core algorithm trait that all JWT signature algorithms implement
///
/// Instances are configured once and shared across threads, so every
/// implementation is `Send + Sync` and immutable after construction.
pub trait SigningAlgorithm: Send + Sync {
    /// The algorithm identifier written to the `alg` header
    fn id(&self) -> AlgorithmId;

    /// The algorithm name (e.g., "HS256", "RS256")
    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    /// Sign `data`
    ///
    /// Symmetric algorithms use `key` as the secret. Asymmetric algorithms
    /// ignore `key` and sign with their own private key.
    fn sign(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>>;

    /// Asymmetric view of this algorithm, if it verifies with a public key
    fn as_asymmetric(&self) -> Option<&dyn AsymmetricAlgorithm> {
        None
    }
}

/// Algorithms verified with a public key rather than by recomputation
pub trait AsymmetricAlgorithm: SigningAlgorithm {
    /// Verify `signature` over `data` with the public key
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool;

    /// Whether a private key is present
    fn can_sign(&self) -> bool;
}

/// Shared, thread-safe algorithm handle
pub type SharedAlgorithm = Arc<dyn SigningAlgorithm>;
