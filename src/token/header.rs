use crate::algorithm::AlgorithmId;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JWT header (JOSE header)
///
/// Registered parameters get typed fields; anything else lands in `extra`
/// in the order it appeared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwtHeader {
    /// Token type (typically "JWT")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// Algorithm used for signing
    #[serde(default)]
    pub alg: String,

    /// Key ID (for JWKS key selection)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Content type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// X.509 URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5u: Option<String>,

    /// X.509 certificate chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,

    /// X.509 certificate SHA-1 thumbprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,

    /// Non-registered header parameters
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JwtHeader {
    /// Parse algorithm from header
    pub fn algorithm(&self) -> Result<AlgorithmId> {
        AlgorithmId::from_str(&self.alg)
    }

    /// Get key ID if present
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_registered_and_extra() {
        let header: JwtHeader = serde_json::from_str(
            r#"{"foo":"bar","typ":"JWT","alg":"RS256","kid":"k1","x5c":["MIIB"],"n":1}"#,
        )
        .unwrap();

        assert_eq!(header.alg, "RS256");
        assert_eq!(header.typ.as_deref(), Some("JWT"));
        assert_eq!(header.key_id(), Some("k1"));
        assert_eq!(header.x5c, Some(vec!["MIIB".to_string()]));
        assert_eq!(header.algorithm().unwrap(), AlgorithmId::RS256);
        assert_eq!(header.extra.keys().collect::<Vec<_>>(), vec!["foo", "n"]);
    }

    #[test]
    fn test_missing_alg_is_unsupported() {
        let header: JwtHeader = serde_json::from_str(r#"{"typ":"JWT"}"#).unwrap();
        assert!(header.alg.is_empty());
        assert!(header.algorithm().is_err());
    }
}
