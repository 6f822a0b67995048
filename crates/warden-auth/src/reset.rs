//! Password reset token generation.

use data_encoding::BASE32_NOPAD;
use rand::Rng;

/// Random bytes per reset token (120 bits).
pub const RESET_TOKEN_BYTES: usize = 15;

/// Encoded length: 15 bytes is a whole number of Base32 groups, so
/// there is never any padding.
pub const RESET_TOKEN_LEN: usize = 24;

/// Generate an opaque single-use reset token: 15 CSPRNG bytes, RFC 4648
/// Base32 (`A-Z2-7`).
///
/// The token carries no structure; validity is decided by the store.
pub fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; RESET_TOKEN_BYTES] = rng.random();
    BASE32_NOPAD.encode(&bytes)
}

/// Build the link mailed to the user: `<base_url>/forgot-password/<token>`.
pub fn reset_link(base_url: &str, token: &str) -> String {
    format!("{}/forgot-password/{token}", base_url.trim_end_matches('/'))
}
