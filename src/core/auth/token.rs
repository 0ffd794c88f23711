//! Session token generation and derivation
//!
//! Clients hold an opaque random token; the database only ever sees its
//! SHA-256 hash, which doubles as the session row's primary key. A leaked
//! sessions table therefore contains nothing that authenticates anyone.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Random bytes per session token (144 bits of entropy)
pub const TOKEN_BYTES: usize = 18;

/// Generate a new opaque session token
///
/// Hex-encoded so it is safe in cookies and URLs without further escaping.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Derive the storage identifier for a token
///
/// Deterministic, so validation can look the session up by recomputing
/// this from the cookie value.
pub fn session_id_from_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
