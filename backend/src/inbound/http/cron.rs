//! Cron HTTP handlers triggering the scheduled jobs.
//!
//! ```text
//! POST /api/v1/cron/assign-round-song
//! POST /api/v1/cron/create-future-rounds
//! POST /api/v1/cron/send-reminder-emails
//! ```
//!
//! Each call must carry `Authorization: Bearer <cron secret>`. Jobs are
//! idempotent, so a scheduler may retry freely.

use actix_web::{HttpRequest, post, web};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_cron_secret;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Job outcome wrapper.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CronJobResponse {
    pub success: bool,
    /// Job-specific report, flattened into the response.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub result: Value,
}

impl CronJobResponse {
    fn from_report<T: Serialize>(report: &T) -> ApiResult<Self> {
        let result = serde_json::to_value(report)
            .map_err(|err| Error::internal(format!("failed to encode job report: {err}")))?;
        Ok(Self {
            success: true,
            result,
        })
    }
}

fn authorise(state: &HttpState, request: &HttpRequest) -> ApiResult<()> {
    require_cron_secret(request.headers(), state.cron_secret())
}

/// Assign the winning song once covering begins.
#[utoipa::path(
    post,
    path = "/api/v1/cron/assign-round-song",
    responses(
        (status = 200, description = "Job outcome", body = CronJobResponse),
        (status = 401, description = "Bad or missing cron secret", body = ErrorSchema),
        (status = 500, description = "Server configuration error", body = ErrorSchema)
    ),
    tags = ["cron"],
    operation_id = "cronAssignRoundSong",
    security(("CronBearer" = []))
)]
#[post("/cron/assign-round-song")]
pub async fn assign_round_song(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<web::Json<CronJobResponse>> {
    authorise(&state, &request)?;
    let response = match state.jobs.assign_round_song().await? {
        Some(outcome) => CronJobResponse::from_report(&outcome)?,
        None => CronJobResponse {
            success: true,
            result: json!({ "outcome": "noCurrentRound" }),
        },
    };
    info!(result = %response.result, "assign-round-song finished");
    Ok(web::Json(response))
}

/// Keep the next quarterly rounds scheduled.
#[utoipa::path(
    post,
    path = "/api/v1/cron/create-future-rounds",
    responses(
        (status = 200, description = "Job outcome", body = CronJobResponse),
        (status = 401, description = "Bad or missing cron secret", body = ErrorSchema),
        (status = 500, description = "Server configuration error", body = ErrorSchema)
    ),
    tags = ["cron"],
    operation_id = "cronCreateFutureRounds",
    security(("CronBearer" = []))
)]
#[post("/cron/create-future-rounds")]
pub async fn create_future_rounds(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<web::Json<CronJobResponse>> {
    authorise(&state, &request)?;
    let report = state.jobs.create_future_rounds().await?;
    info!(created = report.created.len(), errors = report.errors.len(), "create-future-rounds finished");
    Ok(web::Json(CronJobResponse::from_report(&report)?))
}

/// Send the phase reminder emails due today.
#[utoipa::path(
    post,
    path = "/api/v1/cron/send-reminder-emails",
    responses(
        (status = 200, description = "Job outcome", body = CronJobResponse),
        (status = 401, description = "Bad or missing cron secret", body = ErrorSchema),
        (status = 500, description = "Server configuration error", body = ErrorSchema)
    ),
    tags = ["cron"],
    operation_id = "cronSendReminderEmails",
    security(("CronBearer" = []))
)]
#[post("/cron/send-reminder-emails")]
pub async fn send_reminder_emails(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<web::Json<CronJobResponse>> {
    authorise(&state, &request)?;
    let report = state.jobs.send_reminder_emails().await?;
    info!(round = ?report.round, skipped = ?report.skipped_reason, "send-reminder-emails finished");
    Ok(web::Json(CronJobResponse::from_report(&report)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    use crate::domain::ports::{AssignSongOutcome, FutureRoundsReport, MockScheduledJobsCommand};
    use crate::inbound::http::state::HttpStatePorts;

    fn state_with(jobs: MockScheduledJobsCommand, secret: Option<&str>) -> web::Data<HttpState> {
        let state = HttpState::new(HttpStatePorts {
            jobs: Arc::new(jobs),
            ..HttpStatePorts::default()
        });
        web::Data::new(match secret {
            Some(secret) => state.with_cron_secret(secret),
            None => state,
        })
    }

    macro_rules! cron_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new().app_data($state).service(
                    web::scope("/api/v1")
                        .service(assign_round_song)
                        .service(create_future_rounds)
                        .service(send_reminder_emails),
                ),
            )
            .await
        };
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some("Bearer wrong"), StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn bad_secrets_never_run_jobs(
        #[case] authorization: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let mut jobs = MockScheduledJobsCommand::new();
        jobs.expect_create_future_rounds().never();
        let app = cron_app!(state_with(jobs, Some("s3cret")));

        let mut req = actix_test::TestRequest::post().uri("/api/v1/cron/create-future-rounds");
        if let Some(value) = authorization {
            req = req.insert_header(("Authorization", value));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), expected);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "Unauthorized");
    }

    #[actix_web::test]
    async fn unconfigured_secret_reports_configuration_error() {
        let mut jobs = MockScheduledJobsCommand::new();
        jobs.expect_send_reminder_emails().never();
        let app = cron_app!(state_with(jobs, None));

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cron/send-reminder-emails")
            .insert_header(("Authorization", "Bearer anything"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "Server configuration error");
    }

    #[actix_web::test]
    async fn assigned_song_is_reported() {
        let mut jobs = MockScheduledJobsCommand::new();
        jobs.expect_assign_round_song().times(1).returning(|| {
            Ok(Some(AssignSongOutcome::NoVotes {
                round: "2024-01-01".to_owned(),
            }))
        });
        let app = cron_app!(state_with(jobs, Some("s3cret")));

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cron/assign-round-song")
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["outcome"], "noVotes");
        assert_eq!(body["round"], "2024-01-01");
    }

    #[actix_web::test]
    async fn future_round_report_is_flattened() {
        let mut jobs = MockScheduledJobsCommand::new();
        jobs.expect_create_future_rounds().times(1).returning(|| {
            Ok(FutureRoundsReport {
                existing: 1,
                created: vec!["2024-07-01".to_owned()],
                ..FutureRoundsReport::default()
            })
        });
        let app = cron_app!(state_with(jobs, Some("s3cret")));

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/cron/create-future-rounds")
            .insert_header(("Authorization", "Bearer s3cret"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["created"][0], "2024-07-01");
        assert_eq!(body["existing"], 1);
    }
}
