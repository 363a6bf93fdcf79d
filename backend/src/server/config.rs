//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use eptss::domain::NotificationSettings;
use eptss::domain::ports::EmailSender;
use eptss::inbound::http::session_config::SessionSettings;
use eptss::outbound::email::LogOnlyEmailSender;
use eptss::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: CookieDuration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) cron_secret: Option<String>,
    pub(crate) email_sender: Arc<dyn EmailSender>,
    pub(crate) notifications: NotificationSettings,
    pub(crate) login_token_ttl: chrono::Duration,
}

impl ServerConfig {
    /// Construct a configuration from validated session settings.
    ///
    /// Email defaults to the logging sender until [`Self::with_email`] is
    /// called.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
            ttl,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl: ttl,
            bind_addr,
            db_pool: None,
            cron_secret: None,
            email_sender: Arc::new(LogOnlyEmailSender),
            notifications: NotificationSettings::new("http://localhost:8080", None),
            login_token_ttl: chrono::Duration::minutes(
                eptss::domain::DEFAULT_LOGIN_TOKEN_TTL_MINUTES,
            ),
        }
    }

    /// Attach a database connection pool. Without one every service port
    /// falls back to its fixture.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Secret expected in the `Authorization` header of cron calls.
    #[must_use]
    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron_secret = secret;
        self
    }

    /// Email delivery and the links rendered into messages.
    #[must_use]
    pub fn with_email(
        mut self,
        sender: Arc<dyn EmailSender>,
        notifications: NotificationSettings,
    ) -> Self {
        self.email_sender = sender;
        self.notifications = notifications;
        self
    }

    #[must_use]
    pub fn with_login_token_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.login_token_ttl = ttl;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
