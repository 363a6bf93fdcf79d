//! Rendering of the errors the round services produce.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    AccountCommand, FixtureAccountCommand, ParticipationCommand, RoundQuery,
};
use crate::domain::round::RoundSlug;
use crate::domain::{
    NewUser, NotificationSettings, Notifier, ParticipationService, RoundQueryService, SignupDraft,
};
use crate::test_support::fixtures::winter_round_dates;
use crate::test_support::{InMemoryStore, MutableClock, RecordingEmailSender};
use actix_web::body::to_bytes;
use actix_web::http::header;
use rstest::rstest;
use serde_json::{Value, json};

const SLUG: &str = "2022-10-01";
const TRACE_ID: &str = "6f1c2a9e-3b1d-4c55-9a0e-2d4b8f7c1e10";

struct Rendered {
    status: StatusCode,
    cache_control: Option<String>,
    trace_header: Option<String>,
    body: Value,
}

async fn render(error: Error) -> Rendered {
    let response = ResponseError::error_response(&error);
    let header_text = |name| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let cache_control = header_text(header::CACHE_CONTROL);
    let trace_header = header_text(header::HeaderName::from_static(TRACE_ID_HEADER));
    let status = response.status();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("error body is readable");
    Rendered {
        status,
        cache_control,
        trace_header,
        body: serde_json::from_slice(&bytes).expect("error body is JSON"),
    }
}

fn slug() -> RoundSlug {
    RoundSlug::new(SLUG).expect("valid slug")
}

/// Winter round seeded in memory with the clock at `voting_opens`.
fn store_during_voting() -> (Arc<InMemoryStore>, Arc<MutableClock>) {
    let store = InMemoryStore::new();
    store.seed_round(SLUG, winter_round_dates());
    let clock = Arc::new(MutableClock::new(winter_round_dates().voting_opens));
    (store, clock)
}

#[rstest]
#[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
#[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
#[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
#[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
#[case(ErrorCode::Conflict, StatusCode::CONFLICT)]
#[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
#[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
fn every_code_has_a_status(#[case] code: ErrorCode, #[case] expected: StatusCode) {
    assert_eq!(status_for(code), expected);
}

#[rstest]
#[actix_web::test]
async fn hidden_results_render_as_forbidden() {
    let (store, clock) = store_during_voting();
    let service = RoundQueryService::new(store.repositories(), clock);
    let err = service
        .vote_results(&slug(), None)
        .await
        .expect_err("results are hidden while voting");

    let rendered = render(err).await;
    assert_eq!(rendered.status, StatusCode::FORBIDDEN);
    assert_eq!(rendered.body["code"], "forbidden");
    assert_eq!(rendered.body["message"], "results are hidden until voting closes");
    assert_eq!(rendered.cache_control.as_deref(), Some("no-store"));
}

#[rstest]
#[actix_web::test]
async fn closed_signup_renders_as_conflict_with_the_phase() {
    let (store, clock) = store_during_voting();
    let member = store.seed_user("ada@example.com", "ada", 0).id;
    let notifier = Notifier::new(
        Arc::new(RecordingEmailSender::new()),
        NotificationSettings::new("https://eptss.test", None),
    );
    let service = ParticipationService::new(store.repositories(), clock, notifier);
    let draft = SignupDraft::try_new("Heroes", "David Bowie", "https://youtu.be/abc", None)
        .expect("valid draft");
    let err = service
        .sign_up(member, &slug(), draft)
        .await
        .expect_err("signups are closed during voting");

    let rendered = render(err).await;
    assert_eq!(rendered.status, StatusCode::CONFLICT);
    assert_eq!(rendered.body["code"], "conflict");
    assert_eq!(rendered.body["details"]["phase"], "voting");
}

#[rstest]
#[actix_web::test]
async fn missing_database_renders_as_unavailable_without_redaction() {
    let new_user = NewUser::try_new("ada@example.com", "ada", None).expect("valid user");
    let err = FixtureAccountCommand
        .register(new_user)
        .await
        .expect_err("no storage configured");

    let rendered = render(err).await;
    assert_eq!(rendered.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(rendered.body["code"], "service_unavailable");
    assert_eq!(rendered.body["message"], "account storage is not configured");
}

#[rstest]
#[actix_web::test]
async fn internal_errors_keep_the_trace_but_hide_the_cause() {
    let err = Error::internal("invalid milestones stored for round 7")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "roundId": 7 }));

    let rendered = render(err).await;
    assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rendered.body["message"], REDACTED_MESSAGE);
    assert_eq!(rendered.body["traceId"], TRACE_ID);
    assert!(rendered.body.get("details").is_none_or(Value::is_null));
    assert_eq!(rendered.trace_header.as_deref(), Some(TRACE_ID));
}

#[rstest]
#[actix_web::test]
async fn cron_configuration_error_stays_visible() {
    let rendered = render(Error::internal(SERVER_CONFIGURATION_ERROR)).await;
    assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(rendered.body["message"], SERVER_CONFIGURATION_ERROR);
    assert!(rendered.trace_header.is_none());
}

#[rstest]
#[actix_web::test]
async fn validation_details_reach_the_client() {
    let err = Error::invalid_request("covering must begin after voting opens")
        .with_details(json!({ "field": "coveringBegins", "code": "invalid_milestones" }));

    let rendered = render(err).await;
    assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
    assert_eq!(rendered.body["details"]["field"], "coveringBegins");
    assert_eq!(rendered.body["details"]["code"], "invalid_milestones");
}

#[rstest]
fn framework_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("payload overflow").into();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert!(err.details().is_none());
}
