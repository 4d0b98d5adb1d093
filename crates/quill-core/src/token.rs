//! Opaque bearer token generation and lookup digests

use argon2::password_hash::rand_core::{OsRng, RngCore};

/// Issued token length in hex characters (20 random bytes).
pub const TOKEN_LEN: usize = 40;

/// Mint a fresh opaque token value.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN / 2];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest a presented token value for storage and lookup.
///
/// Resolution queries by this digest instead of comparing raw token
/// strings, so lookup cost does not depend on where a mismatch occurs.
pub fn token_digest(token: &str) -> [u8; 32] {
    *blake3::hash(token.as_bytes()).as_bytes()
}
