//! In-process application harness for behaviour tests.
//!
//! Builds the real services over the in-memory store and drives requests
//! through `actix_web::test`. Each call spins a fresh Actix system; storage,
//! clock and mailbox live in the harness so state survives between calls.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{DateTime, Utc};
use eptss::Trace;
use eptss::domain::{
    AccountService, NotificationSettings, Notifier, ParticipationService, RoundAdminService,
    RoundQueryService, ScheduledJobsService,
};
use eptss::inbound::http::configure_api;
use eptss::inbound::http::state::{HttpState, HttpStatePorts};
use eptss::test_support::{InMemoryStore, MutableClock, RecordingEmailSender};
use serde_json::Value;

pub const BASE_URL: &str = "https://eptss.test";
pub const ADMIN_EMAIL: &str = "admin@eptss.test";

/// Status, body and session cookie of one response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

pub struct AppHarness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<MutableClock>,
    pub mailer: Arc<RecordingEmailSender>,
    cron_secret: Option<String>,
    key: Key,
}

impl AppHarness {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            store: InMemoryStore::new(),
            clock: Arc::new(MutableClock::new(now)),
            mailer: Arc::new(RecordingEmailSender::new()),
            cron_secret: None,
            key: Key::generate(),
        }
    }

    pub fn with_cron_secret(mut self, secret: &str) -> Self {
        self.cron_secret = Some(secret.to_owned());
        self
    }

    fn state(&self) -> HttpState {
        let repos = self.store.repositories();
        let notifier = || {
            Notifier::new(
                self.mailer.clone(),
                NotificationSettings::new(BASE_URL, Some(ADMIN_EMAIL.to_owned())),
            )
        };
        let ports = HttpStatePorts {
            rounds: Arc::new(RoundQueryService::new(repos.clone(), self.clock.clone())),
            round_admin: Arc::new(RoundAdminService::new(repos.clone(), self.clock.clone())),
            participation: Arc::new(ParticipationService::new(
                repos.clone(),
                self.clock.clone(),
                notifier(),
            )),
            accounts: Arc::new(AccountService::new(
                repos.clone(),
                self.clock.clone(),
                notifier(),
                chrono::Duration::minutes(30),
            )),
            jobs: Arc::new(ScheduledJobsService::new(
                repos,
                self.clock.clone(),
                notifier(),
            )),
        };
        let state = HttpState::new(ports);
        match &self.cron_secret {
            Some(secret) => state.with_cron_secret(secret.as_str()),
            None => state,
        }
    }

    /// Send `request` through a freshly built app.
    pub fn call(&self, request: TestRequest) -> Reply {
        let state = web::Data::new(self.state());
        let key = self.key.clone();
        actix_web::rt::System::new().block_on(async move {
            let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
                .cookie_name("session".into())
                .cookie_secure(false)
                .cookie_content_security(CookieContentSecurity::Private)
                .cookie_same_site(SameSite::Lax)
                .build();
            let app = test::init_service(
                App::new()
                    .app_data(state)
                    .wrap(Trace)
                    .service(web::scope("/api/v1").wrap(session).configure(configure_api)),
            )
            .await;
            let res = test::call_service(&app, request.to_request()).await;
            let status = res.status().as_u16();
            let cookie = res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .map(Cookie::into_owned);
            let bytes = test::read_body(res).await;
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON response body")
            };
            Reply {
                status,
                body,
                cookie,
            }
        })
    }

    /// Register a member, follow the emailed link and return the session
    /// cookie.
    pub fn log_in_new_member(&self, email: &str, username: &str) -> Cookie<'static> {
        let registered = self.call(
            TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(serde_json::json!({ "email": email, "username": username })),
        );
        assert_eq!(registered.status, 201, "register: {}", registered.body);
        let token = self.latest_login_token(email);
        let verified = self.call(
            TestRequest::post()
                .uri("/api/v1/auth/verify")
                .set_json(serde_json::json!({ "token": token })),
        );
        assert_eq!(verified.status, 200, "verify: {}", verified.body);
        verified.cookie.expect("session cookie after login")
    }

    /// Token from the most recent login link mailed to `email`.
    pub fn latest_login_token(&self, email: &str) -> String {
        let message = self
            .mailer
            .sent_to(email)
            .into_iter()
            .rev()
            .find(|message| message.html.contains("token="))
            .expect("login link email");
        let (_, rest) = message.html.split_once("token=").expect("token parameter");
        rest.chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect()
    }
}
