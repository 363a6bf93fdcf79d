//! Driving port for registration and passwordless login.
//!
//! Inbound adapters call [`AccountCommand`] without knowing how tokens are
//! stored or delivered.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, NewUser, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account and email a login link.
    async fn register(&self, new_user: NewUser) -> Result<User, Error>;

    /// Email a login link when the address is registered. Unknown addresses
    /// succeed silently.
    async fn request_login_link(&self, email: EmailAddress) -> Result<(), Error>;

    /// Exchange a raw login token for the account it was issued to.
    async fn verify_login(&self, raw_token: &str) -> Result<User, Error>;

    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;
}

/// Account command used when no database is configured.
///
/// Every login attempt fails, so no session is ever established.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountCommand;

#[async_trait]
impl AccountCommand for FixtureAccountCommand {
    async fn register(&self, _new_user: NewUser) -> Result<User, Error> {
        Err(Error::service_unavailable("account storage is not configured"))
    }

    async fn request_login_link(&self, _email: EmailAddress) -> Result<(), Error> {
        Ok(())
    }

    async fn verify_login(&self, _raw_token: &str) -> Result<User, Error> {
        Err(Error::unauthorized("invalid or expired login token"))
    }

    async fn current_user(&self, _user_id: UserId) -> Result<User, Error> {
        Err(Error::unauthorized("login required"))
    }
}
