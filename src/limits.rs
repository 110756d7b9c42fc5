//! Size limit constants for input validation

/// Maximum length for a JWT token string (64KB)
pub const MAX_TOKEN_LENGTH: usize = 64 * 1024;

// ============================================================================
// Decoded segment size limits
// ============================================================================

/// Maximum size for decoded JWT header JSON (8KB)
pub const MAX_DECODED_HEADER_SIZE: usize = 8 * 1024;

/// Maximum size for decoded JWT payload JSON (64KB)
pub const MAX_DECODED_PAYLOAD_SIZE: usize = 64 * 1024;

/// Maximum size for decoded signature bytes (1KB)
/// RSA-8192 signatures are exactly 1024 bytes
pub const MAX_DECODED_SIGNATURE_SIZE: usize = 1024;

// ============================================================================
// Header field size limits
// ============================================================================

/// Maximum length for algorithm (alg) field in JWT header (16 bytes)
pub const MAX_ALG_LENGTH: usize = 16;

/// Maximum length for key ID (kid) field in JWT header (256 bytes)
pub const MAX_KID_LENGTH: usize = 256;

// ============================================================================
// JWK set limits
// ============================================================================

/// Maximum size for a JWKS JSON document (512KB)
pub const MAX_JWKS_DOCUMENT_SIZE: usize = 512 * 1024;

/// Maximum number of keys in a JWK set
pub const MAX_JWK_SET_SIZE: usize = 100;

/// Maximum size for Base64URL-encoded RSA modulus (n) field (12KB)
pub const MAX_JWK_N_SIZE: usize = 12 * 1024;

/// Maximum size for Base64URL-encoded RSA exponent (e) field
pub const MAX_JWK_E_SIZE: usize = 64;

/// Maximum size for Base64URL-encoded EC coordinates (x, y)
/// P-521 coordinates are 66 bytes, 88 characters encoded
pub const MAX_JWK_COORDINATE_SIZE: usize = 128;

// ============================================================================
// Validation bounds
// ============================================================================

/// Maximum time margin (clock skew tolerance) in seconds
/// Larger margins would effectively disable expiration checks
pub const MAX_TIME_MARGIN_SECONDS: u64 = 300;
