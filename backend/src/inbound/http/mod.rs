//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers only translate JSON and sessions into driving-port calls; the
//! round phase rules live in the domain services behind [`state::HttpState`].

pub mod admin;
pub mod auth;
pub mod cache_control;
pub mod cron;
pub mod error;
pub mod health;
pub mod participation;
pub mod rounds;
pub mod rounds_dto;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` route on `cfg`.
///
/// Literal round paths are registered ahead of `/rounds/{slug}` so `current`
/// and `future` never parse as slugs.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::request_login_link)
        .service(users::verify_login)
        .service(users::logout)
        .service(users::current_user)
        .service(rounds::list_rounds)
        .service(rounds::current_round)
        .service(rounds::future_rounds)
        .service(rounds::get_round)
        .service(rounds::voting_options)
        .service(rounds::vote_results)
        .service(participation::sign_up)
        .service(participation::vote)
        .service(participation::submit_cover)
        .service(participation::my_participation)
        .service(admin::create_round)
        .service(admin::update_round)
        .service(admin::set_round_song)
        .service(admin::round_report)
        .service(admin::submit_for_user)
        .service(cron::assign_round_song)
        .service(cron::create_future_rounds)
        .service(cron::send_reminder_emails);
}
