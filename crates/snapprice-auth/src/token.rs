//! Unguessable random identifiers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Number of random bytes behind every session id and CSRF token.
const TOKEN_BYTES: usize = 32;

/// Generate a URL-safe random token with 256 bits of entropy.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
