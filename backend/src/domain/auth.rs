//! Passwordless login tokens.
//!
//! A raw token is emailed to the member and never persisted. Storage keeps
//! only its SHA-256 hex digest, so a leaked table cannot be replayed.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of random bytes in a login token.
pub const LOGIN_TOKEN_BYTES: usize = 32;

/// Freshly minted login token.
///
/// The raw value is zeroized on drop.
///
/// # Examples
/// ```
/// use eptss::domain::LoginToken;
///
/// let token = LoginToken::generate();
/// assert_eq!(token.raw().len(), 64);
/// assert_eq!(token.hash().len(), 64);
/// ```
#[derive(Debug)]
pub struct LoginToken {
    raw: Zeroizing<String>,
    hash: String,
}

impl LoginToken {
    /// Generate a random token from the operating system RNG.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; LOGIN_TOKEN_BYTES]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        let raw = Zeroizing::new(hex::encode(bytes.as_slice()));
        let hash = hash_login_token(&raw);
        Self { raw, hash }
    }

    /// Value embedded in the login link.
    pub fn raw(&self) -> &str {
        self.raw.as_str()
    }

    /// Digest stored in the database.
    pub fn hash(&self) -> &str {
        self.hash.as_str()
    }
}

/// Hash a raw token the same way it was hashed at issue time.
///
/// Surrounding whitespace is ignored so tokens pasted from email still match.
pub fn hash_login_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.trim().as_bytes()))
}

/// Compare two secrets without short-circuiting on the first mismatch.
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
