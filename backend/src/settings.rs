//! Application settings loaded via OrthoConfig.
//!
//! Values come from `EPTSS_*` environment variables, an optional
//! configuration file and command-line flags, in OrthoConfig's usual order of
//! precedence. Session cookie settings are loaded separately, see
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EMAIL_FROM: &str = "EPTSS <noreply@everyoneplaysthesamesong.com>";
const DEFAULT_BASE_URL: &str = "https://everyoneplaysthesamesong.com";
const DEFAULT_LOGIN_TOKEN_TTL_MINUTES: i64 = 30;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Invalid setting value.
#[derive(Debug, thiserror::Error)]
#[error("invalid bind address {value:?}: {source}")]
pub struct BindAddrError {
    value: String,
    #[source]
    source: std::net::AddrParseError,
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EPTSS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. Without it the server runs on fixture
    /// ports: reads come back empty and writes answer `503`.
    pub database_url: Option<String>,
    /// Apply embedded migrations at startup. Defaults to on.
    pub run_migrations: Option<bool>,
    /// Shared secret for the cron endpoints.
    pub cron_secret: Option<String>,
    /// Resend API key. Without it emails are only logged.
    pub resend_api_key: Option<String>,
    /// `From` header for outgoing email.
    pub email_from: Option<String>,
    /// Address notified about new signups and song assignments.
    pub admin_email: Option<String>,
    /// Public site URL used in email links.
    pub base_url: Option<String>,
    /// Lifetime of emailed login links.
    pub login_token_ttl_minutes: Option<i64>,
    /// Maximum database connections.
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, BindAddrError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| BindAddrError {
            value: value.to_owned(),
            source,
        })
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn email_from(&self) -> &str {
        self.email_from.as_deref().unwrap_or(DEFAULT_EMAIL_FROM)
    }

    /// Site URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Login link lifetime; non-positive values fall back to the default.
    pub fn login_token_ttl_minutes(&self) -> i64 {
        self.login_token_ttl_minutes
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_LOGIN_TOKEN_TTL_MINUTES)
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Configured Resend key, ignoring blank values.
    pub fn resend_api_key(&self) -> Option<&str> {
        self.resend_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "EPTSS_BIND_ADDR",
        "EPTSS_DATABASE_URL",
        "EPTSS_RUN_MIGRATIONS",
        "EPTSS_CRON_SECRET",
        "EPTSS_RESEND_API_KEY",
        "EPTSS_EMAIL_FROM",
        "EPTSS_ADMIN_EMAIL",
        "EPTSS_BASE_URL",
        "EPTSS_LOGIN_TOKEN_TTL_MINUTES",
        "EPTSS_POOL_MAX_SIZE",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("eptss")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address").to_string(),
            DEFAULT_BIND_ADDR
        );
        assert!(settings.run_migrations());
        assert!(settings.database_url.is_none());
        assert!(settings.cron_secret.is_none());
        assert_eq!(settings.email_from(), DEFAULT_EMAIL_FROM);
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
        assert_eq!(settings.login_token_ttl_minutes(), 30);
        assert_eq!(settings.pool_max_size(), 10);
        assert!(settings.resend_api_key().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        let overrides = [
            ("EPTSS_BIND_ADDR", "127.0.0.1:9000"),
            ("EPTSS_RUN_MIGRATIONS", "false"),
            ("EPTSS_CRON_SECRET", "s3cret"),
            ("EPTSS_BASE_URL", "http://localhost:3000/"),
            ("EPTSS_LOGIN_TOKEN_TTL_MINUTES", "15"),
            ("EPTSS_RESEND_API_KEY", "   "),
        ];
        for (name, value) in overrides {
            if let Some(slot) = vars.iter_mut().find(|(key, _)| *key == name) {
                slot.1 = Some(value.to_owned());
            }
        }
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").to_string(),
            "127.0.0.1:9000"
        );
        assert!(!settings.run_migrations());
        assert_eq!(settings.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.base_url(), "http://localhost:3000");
        assert_eq!(settings.login_token_ttl_minutes(), 15);
        assert!(settings.resend_api_key().is_none());
    }

    #[rstest]
    fn malformed_bind_address_is_an_error() {
        let mut vars = VARS.map(|name| (name, None::<String>));
        vars[0].1 = Some("not-an-address".to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        let err = settings.bind_addr().expect_err("invalid address");
        assert!(err.to_string().contains("not-an-address"));
    }
}
