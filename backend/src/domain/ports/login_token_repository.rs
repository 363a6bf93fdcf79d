//! Port for single-use login tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by login token repository adapters.
    pub enum LoginTokenRepositoryError {
        Connection { message: String } => "login token repository connection failed: {message}",
        Query { message: String } => "login token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginTokenRepository: Send + Sync {
    /// Store a token digest for `user_id`.
    async fn store(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LoginTokenRepositoryError>;

    /// Atomically mark an unexpired, unconsumed token as consumed and return
    /// its owner. Returns `None` for unknown, expired or spent tokens.
    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, LoginTokenRepositoryError>;

    /// Delete tokens that can no longer be used: expired by `now` or already
    /// consumed. Returns how many rows were removed.
    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, LoginTokenRepositoryError>;
}
