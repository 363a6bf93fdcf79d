//! Builders wiring domain services into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use eptss::domain::ports::{EmailSender, Repositories};
use eptss::domain::{
    AccountService, NotificationSettings, Notifier, ParticipationService, RoundAdminService,
    RoundQueryService, ScheduledJobsService,
};
use eptss::inbound::http::state::{HttpState, HttpStatePorts};
use eptss::outbound::persistence::diesel_repositories;

use super::ServerConfig;

/// Everything the services need besides storage.
#[derive(Clone)]
struct ServiceDeps {
    clock: Arc<dyn Clock>,
    email_sender: Arc<dyn EmailSender>,
    notifications: NotificationSettings,
    login_token_ttl: chrono::Duration,
}

impl ServiceDeps {
    fn notifier(&self) -> Notifier {
        Notifier::new(self.email_sender.clone(), self.notifications.clone())
    }
}

/// Build every driving port over `repos`, or fall back to fixtures when no
/// storage is configured.
fn build_ports(repos: Option<Repositories>, deps: &ServiceDeps) -> HttpStatePorts {
    let Some(repos) = repos else {
        return HttpStatePorts::default();
    };
    HttpStatePorts {
        rounds: Arc::new(RoundQueryService::new(repos.clone(), deps.clock.clone())),
        round_admin: Arc::new(RoundAdminService::new(repos.clone(), deps.clock.clone())),
        participation: Arc::new(ParticipationService::new(
            repos.clone(),
            deps.clock.clone(),
            deps.notifier(),
        )),
        accounts: Arc::new(AccountService::new(
            repos.clone(),
            deps.clock.clone(),
            deps.notifier(),
            deps.login_token_ttl,
        )),
        jobs: Arc::new(ScheduledJobsService::new(
            repos,
            deps.clock.clone(),
            deps.notifier(),
        )),
    }
}

/// Build the shared HTTP state from the server configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let deps = ServiceDeps {
        clock: Arc::new(mockable::DefaultClock),
        email_sender: config.email_sender.clone(),
        notifications: config.notifications.clone(),
        login_token_ttl: config.login_token_ttl,
    };
    let repos = config.db_pool.as_ref().map(diesel_repositories);
    let mut state = HttpState::new(build_ports(repos, &deps));
    if let Some(secret) = &config.cron_secret {
        state = state.with_cron_secret(secret.as_str());
    }
    web::Data::new(state)
}
