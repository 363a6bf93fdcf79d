//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::domain::ports::{
    AccountCommand, FixtureAccountCommand, FixtureParticipationCommand, FixtureRoundAdminCommand,
    FixtureRoundQuery, FixtureScheduledJobsCommand, ParticipationCommand, RoundAdminCommand,
    RoundQuery, ScheduledJobsCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub rounds: Arc<dyn RoundQuery>,
    pub round_admin: Arc<dyn RoundAdminCommand>,
    pub participation: Arc<dyn ParticipationCommand>,
    pub accounts: Arc<dyn AccountCommand>,
    pub jobs: Arc<dyn ScheduledJobsCommand>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            rounds: Arc::new(FixtureRoundQuery),
            round_admin: Arc::new(FixtureRoundAdminCommand),
            participation: Arc::new(FixtureParticipationCommand),
            accounts: Arc::new(FixtureAccountCommand),
            jobs: Arc::new(FixtureScheduledJobsCommand),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub rounds: Arc<dyn RoundQuery>,
    pub round_admin: Arc<dyn RoundAdminCommand>,
    pub participation: Arc<dyn ParticipationCommand>,
    pub accounts: Arc<dyn AccountCommand>,
    pub jobs: Arc<dyn ScheduledJobsCommand>,
    cron_secret: Option<Arc<Zeroizing<String>>>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle. Cron endpoints stay locked until
    /// a secret is attached with [`HttpState::with_cron_secret`].
    ///
    /// # Examples
    /// ```
    /// use eptss::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default()).with_cron_secret("s3cret");
    /// assert_eq!(state.cron_secret(), Some("s3cret"));
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            rounds,
            round_admin,
            participation,
            accounts,
            jobs,
        } = ports;
        Self {
            rounds,
            round_admin,
            participation,
            accounts,
            jobs,
            cron_secret: None,
        }
    }

    /// Attach the shared secret expected in cron `Authorization` headers.
    /// Blank secrets are ignored.
    #[must_use]
    pub fn with_cron_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.cron_secret = if secret.trim().is_empty() {
            None
        } else {
            Some(Arc::new(Zeroizing::new(secret)))
        };
        self
    }

    /// Configured cron secret, if any.
    pub fn cron_secret(&self) -> Option<&str> {
        self.cron_secret.as_deref().map(|secret| secret.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("secret", Some("secret"))]
    fn blank_cron_secrets_are_ignored(#[case] raw: &str, #[case] expected: Option<&str>) {
        let state = HttpState::new(HttpStatePorts::default()).with_cron_secret(raw);
        assert_eq!(state.cron_secret(), expected);
    }
}
