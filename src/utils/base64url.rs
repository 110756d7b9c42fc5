//! Base64URL encoding/decoding per RFC 4648 §5
//!
//! Thin wrapper around the `base64` crate. Encoding never emits padding;
//! decoding accepts input with or without trailing `=`, so a segment of
//! length `4n + 1` is the only length that is rejected outright.

use crate::error::{Error, Result};
use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes to an unpadded Base64URL string
pub fn encode(input: impl AsRef<[u8]>) -> String {
    URL_SAFE_LENIENT.encode(input)
}

/// Decode a Base64URL string to bytes
pub fn decode(input: &str) -> Result<Vec<u8>> {
    URL_SAFE_LENIENT
        .decode(input)
        .map_err(|e| Error::FormatInvalidBase64(format!("Base64URL decode failed: {e}")))
}

/// Decode Base64URL string to bytes with maximum size limit
pub(crate) fn decode_bytes(input: &str, max_size: usize) -> Result<Vec<u8>> {
    let result = decode(input)?;

    if result.len() > max_size {
        return Err(Error::FormatInvalidBase64(format!(
            "Decoded size exceeds limit: {} bytes (max: {})",
            result.len(),
            max_size
        )));
    }

    Ok(result)
}

/// Decode Base64URL string to UTF-8 string with size limit
pub(crate) fn decode_string(input: &str, max_size: usize) -> Result<String> {
    decode_bytes(input, max_size).and_then(|bytes| {
        String::from_utf8(bytes)
            .map_err(|e| Error::FormatInvalidBase64(format!("Invalid UTF-8: {e}")))
    })
}
