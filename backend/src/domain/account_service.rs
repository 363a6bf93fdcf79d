//! Account registration and passwordless login.
//!
//! Login links carry a random token; only its SHA-256 digest is stored and a
//! token is consumed on first use. Requests for unknown addresses succeed
//! silently so the endpoint cannot be used to enumerate members.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::auth::{LoginToken, hash_login_token};
use crate::domain::notifications::Notifier;
use crate::domain::ports::{AccountCommand, Repositories};
use crate::domain::service_support::{map_login_token_error, map_user_error, require_user};
use crate::domain::{EmailAddress, Error, NewUser, User, UserId};

/// Default lifetime of an emailed login link.
pub const DEFAULT_LOGIN_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Clone)]
pub struct AccountService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    token_ttl: Duration,
}

impl AccountService {
    pub fn new(
        repos: Repositories,
        clock: Arc<dyn Clock>,
        notifier: Notifier,
        token_ttl: Duration,
    ) -> Self {
        Self {
            repos,
            clock,
            notifier,
            token_ttl,
        }
    }

    async fn issue_login_link(&self, user: &User) -> Result<(), Error> {
        let now = self.clock.utc();
        match self.repos.login_tokens.purge_stale(now).await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "stale login tokens removed"),
            Err(err) => warn!(error = %err, "stale login token purge failed"),
        }
        let token = LoginToken::generate();
        let expires_at = now + self.token_ttl;
        self.repos
            .login_tokens
            .store(token.hash(), user.id, expires_at)
            .await
            .map_err(map_login_token_error)?;
        self.notifier
            .send_best_effort(
                self.notifier.templates().login_link(user, token.raw()),
                "login_link",
            )
            .await;
        Ok(())
    }
}

#[async_trait]
impl AccountCommand for AccountService {
    async fn register(&self, new_user: NewUser) -> Result<User, Error> {
        let user = self
            .repos
            .users
            .insert(&new_user)
            .await
            .map_err(map_user_error)?;
        info!(user = %user.id, "member registered");
        self.issue_login_link(&user).await?;
        Ok(user)
    }

    async fn request_login_link(&self, email: EmailAddress) -> Result<(), Error> {
        let user = self
            .repos
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?;
        match user {
            Some(user) => self.issue_login_link(&user).await,
            None => {
                debug!("login link requested for unknown address");
                Ok(())
            }
        }
    }

    async fn verify_login(&self, raw_token: &str) -> Result<User, Error> {
        let invalid = || Error::unauthorized("invalid or expired login token");
        if raw_token.trim().is_empty() {
            return Err(invalid());
        }
        let user_id = self
            .repos
            .login_tokens
            .consume(&hash_login_token(raw_token), self.clock.utc())
            .await
            .map_err(map_login_token_error)?
            .ok_or_else(invalid)?;
        let user = self
            .repos
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid)?;
        info!(user = %user.id, "login verified");
        Ok(user)
    }

    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        require_user(&self.repos, user_id).await
    }
}
