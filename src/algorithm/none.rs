use super::{AlgorithmId, SigningAlgorithm};
use crate::error::{Error, Result};

/// Unsecured JWT algorithm (`alg: "none"`)
///
/// Signing is refused, so a token carrying `alg: "none"` can never pass
/// signature verification even when a factory hands this algorithm out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAlgorithm;

impl SigningAlgorithm for NoneAlgorithm {
    fn id(&self) -> AlgorithmId {
        AlgorithmId::None
    }

    fn sign(&self, _key: &[u8], _data: &[u8]) -> Result<Vec<u8>> {
        Err(Error::OperationNotSupported(
            "the 'none' algorithm cannot sign or verify tokens".into(),
        ))
    }
}
