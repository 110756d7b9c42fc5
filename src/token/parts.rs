use crate::error::{Error, Result};
use crate::limits::MAX_TOKEN_LENGTH;

/// The three Base64URL segments of a compact JWS
///
/// Parsing only checks the shape: length and exactly three `.`-separated
/// segments. Nothing is decoded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtParts {
    header: String,
    payload: String,
    signature: String,
}

impl JwtParts {
    /// Split a token string into header, payload and signature segments
    ///
    /// # Example
    /// ```ignore
    /// let parts = JwtParts::parse("aaa.bbb.ccc")?;
    /// assert_eq!(parts.signing_input(), "aaa.bbb");
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(Error::TokenTooLarge {
                size: token.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        let segments: Vec<&str> = token.split('.').collect();
        match segments.as_slice() {
            [header, payload, signature] => Ok(Self {
                header: (*header).to_string(),
                payload: (*payload).to_string(),
                signature: (*signature).to_string(),
            }),
            _ => Err(Error::FormatInvalid {
                segments: segments.len(),
            }),
        }
    }

    /// Base64URL header segment
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Base64URL payload segment
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Base64URL signature segment
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn segments(&self) -> [&str; 3] {
        [&self.header, &self.payload, &self.signature]
    }

    /// The signed bytes: `header.payload`
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_segments() {
        let parts = JwtParts::parse("aaa.bbb.ccc").unwrap();
        assert_eq!(parts.header(), "aaa");
        assert_eq!(parts.payload(), "bbb");
        assert_eq!(parts.signature(), "ccc");
        assert_eq!(parts.segments(), ["aaa", "bbb", "ccc"]);
        assert_eq!(parts.signing_input(), "aaa.bbb");
    }

    #[test]
    fn test_empty_signature_segment_is_structurally_valid() {
        let parts = JwtParts::parse("aaa.bbb.").unwrap();
        assert_eq!(parts.signature(), "");
    }

    #[test]
    fn test_wrong_segment_counts() {
        for (token, expected) in [("", 1), ("aaa", 1), ("aaa.bbb", 2), ("a.b.c.d", 4), ("a.b.c.d.e", 5)] {
            assert!(
                matches!(JwtParts::parse(token), Err(Error::FormatInvalid { segments }) if segments == expected),
                "{token:?} should report {expected} segments"
            );
        }
    }

    #[test]
    fn test_oversized_token() {
        let token = format!("{}.b.c", "a".repeat(MAX_TOKEN_LENGTH));
        assert!(matches!(
            JwtParts::parse(&token),
            Err(Error::TokenTooLarge { .. })
        ));
    }
}
