//! Session key fingerprinting.
//!
//! The server logs a short fingerprint of the active key at startup so
//! operators can confirm a rotation took effect without exposing the key.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Bytes of the digest kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of SHA-256 over the key's signing half, hex encoded.
///
/// ```rust
/// use actix_web::cookie::Key;
/// use eptss::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}
