//! Member participation HTTP handlers.
//!
//! ```text
//! POST /api/v1/rounds/{slug}/signup      {"title":"…","artist":"…","youtubeLink":"…"}
//! PUT  /api/v1/rounds/{slug}/votes       {"votes":[{"songId":1,"score":5}]}
//! POST /api/v1/rounds/{slug}/submission  {"soundcloudUrl":"…"}
//! GET  /api/v1/rounds/{slug}/me
//! ```
//!
//! All routes require a session. Each write is only accepted during its phase;
//! outside it the service answers `409` with a phase-specific message.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::MyParticipation;
use crate::domain::round::{Phase, SongId};
use crate::domain::voting::Ballot;
use crate::domain::{SignupDraft, SubmissionDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::rounds_dto::{SignupResponse, SubmissionResponse, VoteResponse};
use crate::inbound::http::schemas::{ErrorSchema, PhaseSchema};
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, ballot_error, parse_slug, participation_error, require,
};

/// Signup form: the song the member wants the group to cover.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[schema(example = "Harvest Moon")]
    pub title: Option<String>,
    #[schema(example = "Neil Young")]
    pub artist: Option<String>,
    #[schema(example = "https://www.youtube.com/watch?v=n2MtEsrcTTs")]
    pub youtube_link: Option<String>,
    pub additional_comments: Option<String>,
}

impl SignupRequest {
    fn into_draft(self) -> ApiResult<SignupDraft> {
        let title = require(self.title, FieldName::new("title"))?;
        let artist = require(self.artist, FieldName::new("artist"))?;
        let youtube_link = require(self.youtube_link, FieldName::new("youtubeLink"))?;
        SignupDraft::try_new(
            &title,
            &artist,
            &youtube_link,
            self.additional_comments.as_deref(),
        )
        .map_err(participation_error)
    }
}

/// One star rating in a ballot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteEntry {
    pub song_id: i64,
    #[schema(minimum = 1, maximum = 5)]
    pub score: i64,
}

/// Complete ballot. Replaces any earlier ballot for the round.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub votes: Option<Vec<VoteEntry>>,
}

impl VoteRequest {
    fn into_ballot(self) -> ApiResult<Ballot> {
        let votes = require(self.votes, FieldName::new("votes"))?;
        Ballot::try_new(
            votes
                .into_iter()
                .map(|entry| (SongId(entry.song_id), entry.score))
                .collect(),
        )
        .map_err(ballot_error)
    }
}

/// Cover submission form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[schema(example = "https://soundcloud.com/ada/harvest-moon")]
    pub soundcloud_url: Option<String>,
    pub additional_comments: Option<String>,
}

impl SubmissionRequest {
    pub(crate) fn into_draft(self) -> ApiResult<SubmissionDraft> {
        let url = require(self.soundcloud_url, FieldName::new("soundcloudUrl"))?;
        SubmissionDraft::try_new(&url, self.additional_comments.as_deref())
            .map_err(participation_error)
    }
}

/// The member's own state in a round.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyParticipationResponse {
    #[schema(value_type = PhaseSchema)]
    pub phase: Phase,
    pub signup: Option<SignupResponse>,
    pub votes: Vec<VoteResponse>,
    pub submission: Option<SubmissionResponse>,
}

impl From<MyParticipation> for MyParticipationResponse {
    fn from(value: MyParticipation) -> Self {
        Self {
            phase: value.phase,
            signup: value.signup.map(SignupResponse::from),
            votes: value.votes.into_iter().map(VoteResponse::from).collect(),
            submission: value.submission.map(SubmissionResponse::from),
        }
    }
}

/// Sign up for a round, or update an existing signup.
#[utoipa::path(
    post,
    path = "/api/v1/rounds/{slug}/signup",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = SignupRequest,
    responses(
        (
            status = 200,
            description = "Stored signup",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = SignupResponse
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema),
        (status = 409, description = "Signups are closed", body = ErrorSchema)
    ),
    tags = ["participation"],
    operation_id = "signUp"
)]
#[post("/rounds/{slug}/signup")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let draft = payload.into_inner().into_draft()?;
    let signup = state.participation.sign_up(user_id, &slug, draft).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(SignupResponse::from(signup)))
}

/// Replace the member's ballot.
#[utoipa::path(
    put,
    path = "/api/v1/rounds/{slug}/votes",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = VoteRequest,
    responses(
        (
            status = 200,
            description = "Stored ballot",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = [VoteResponse]
        ),
        (status = 400, description = "Invalid ballot", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema),
        (status = 409, description = "Voting is not open", body = ErrorSchema)
    ),
    tags = ["participation"],
    operation_id = "submitVotes"
)]
#[put("/rounds/{slug}/votes")]
pub async fn vote(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let ballot = payload.into_inner().into_ballot()?;
    let votes = state.participation.vote(user_id, &slug, ballot).await?;
    let votes: Vec<VoteResponse> = votes.into_iter().map(VoteResponse::from).collect();
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(votes))
}

/// Submit, or resubmit, the member's cover.
#[utoipa::path(
    post,
    path = "/api/v1/rounds/{slug}/submission",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = SubmissionRequest,
    responses(
        (
            status = 200,
            description = "Stored submission",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = SubmissionResponse
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not signed up for the round", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema),
        (status = 409, description = "Submissions are not open", body = ErrorSchema)
    ),
    tags = ["participation"],
    operation_id = "submitCover"
)]
#[post("/rounds/{slug}/submission")]
pub async fn submit_cover(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<SubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let draft = payload.into_inner().into_draft()?;
    let submission = state
        .participation
        .submit_cover(user_id, &slug, draft)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(SubmissionResponse::from(submission)))
}

/// The member's signup, ballot and submission for a round.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/{slug}/me",
    params(("slug" = String, Path, description = "Round slug")),
    responses(
        (
            status = 200,
            description = "Participation",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = MyParticipationResponse
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["participation"],
    operation_id = "getMyParticipation"
)]
#[get("/rounds/{slug}/me")]
pub async fn my_participation(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let participation = state.participation.my_participation(user_id, &slug).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(MyParticipationResponse::from(participation)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::ports::MockParticipationCommand;
    use crate::domain::round::{RoundId, Song};
    use crate::domain::{Error, ErrorCode, Signup, Submission, UserId};
    use crate::inbound::http::state::HttpStatePorts;
    use crate::inbound::http::test_utils::{
        MEMBER_ID, session_cookie, test_login, test_session_middleware,
    };
    use crate::test_support::fixtures::utc;

    fn state_with(command: MockParticipationCommand) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            participation: Arc::new(command),
            ..HttpStatePorts::default()
        }))
    }

    macro_rules! participation_app {
        ($state:expr) => {
            actix_test::init_service(
                App::new()
                    .app_data($state)
                    .wrap(test_session_middleware())
                    .route("/test/login/{id}", web::post().to(test_login))
                    .service(
                        web::scope("/api/v1")
                            .service(sign_up)
                            .service(vote)
                            .service(submit_cover)
                            .service(my_participation),
                    ),
            )
            .await
        };
    }

    macro_rules! login {
        ($app:expr) => {{
            let res = actix_test::call_service(
                &$app,
                actix_test::TestRequest::post()
                    .uri(&format!("/test/login/{MEMBER_ID}"))
                    .to_request(),
            )
            .await;
            session_cookie(&res)
        }};
    }

    #[rstest]
    fn signup_request_requires_the_youtube_link() {
        let request = SignupRequest {
            title: Some("Jolene".to_owned()),
            artist: Some("Dolly Parton".to_owned()),
            youtube_link: None,
            additional_comments: None,
        };
        let err = request.into_draft().expect_err("missing link");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.get("field")).and_then(Value::as_str),
            Some("youtubeLink")
        );
    }

    #[rstest]
    #[case(json!([]), "No votes submitted")]
    #[case(json!([{"songId": 1, "score": 6}]), "score must be between 1 and 5, got 6")]
    fn invalid_ballots_are_rejected(#[case] votes: Value, #[case] message: &str) {
        let request: VoteRequest =
            serde_json::from_value(json!({ "votes": votes })).expect("request shape");
        let err = request.into_ballot().expect_err("invalid ballot");
        assert_eq!(err.message(), message);
    }

    /// A command that accepts every write from any phase.
    fn accepting_command() -> MockParticipationCommand {
        let mut command = MockParticipationCommand::new();
        command.expect_sign_up().returning(|user_id, _, draft| {
            Ok(Signup {
                id: 1,
                round_id: RoundId(7),
                user_id,
                song: Song {
                    id: SongId(3),
                    title: draft.song.title().to_owned(),
                    artist: draft.song.artist().to_owned(),
                },
                youtube_link: draft.youtube_link,
                additional_comments: draft.additional_comments,
                created_at: utc(2024, 1, 5),
            })
        });
        command.expect_vote().returning(|_, _, _| Ok(Vec::new()));
        command.expect_submit_cover().returning(|user_id, _, draft| {
            Ok(Submission {
                id: 1,
                round_id: RoundId(7),
                user_id,
                soundcloud_url: draft.soundcloud_url,
                additional_comments: draft.additional_comments,
                created_at: utc(2024, 3, 5),
            })
        });
        command
    }

    #[rstest]
    #[case::signup(
        actix_test::TestRequest::post().uri("/api/v1/rounds/2024-01-01/signup"),
        json!({"title": "Jolene", "artist": "Dolly Parton",
            "youtubeLink": "https://youtu.be/Ixrje2rXLMA"})
    )]
    #[case::ballot(
        actix_test::TestRequest::put().uri("/api/v1/rounds/2024-01-01/votes"),
        json!({"votes": [{"songId": 3, "score": 4}]})
    )]
    #[case::submission(
        actix_test::TestRequest::post().uri("/api/v1/rounds/2024-01-01/submission"),
        json!({"soundcloudUrl": "https://soundcloud.com/ada/jolene"})
    )]
    #[actix_web::test]
    async fn accepted_writes_are_not_cached(
        #[case] request: actix_test::TestRequest,
        #[case] payload: Value,
    ) {
        let app = participation_app!(state_with(accepting_command()));
        let cookie = login!(app);

        let req = request.cookie(cookie).set_json(payload).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("Cache-Control")
                .and_then(|v| v.to_str().ok()),
            Some("private, no-cache, must-revalidate")
        );
    }

    #[actix_web::test]
    async fn anonymous_signup_is_unauthorised() {
        let mut command = MockParticipationCommand::new();
        command.expect_sign_up().never();
        let app = participation_app!(state_with(command));

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/rounds/2024-01-01/signup")
            .set_json(json!({"title": "Jolene", "artist": "Dolly Parton",
                "youtubeLink": "https://youtu.be/Ixrje2rXLMA"}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn closed_phase_maps_to_conflict() {
        let member = UserId::new(MEMBER_ID).expect("id");
        let mut command = MockParticipationCommand::new();
        command
            .expect_vote()
            .withf(move |user, slug, ballot| {
                *user == member && slug.as_ref() == "2024-01-01" && ballot.entries().len() == 2
            })
            .times(1)
            .returning(|_, _, _| Err(Error::conflict("voting is not open for this round")));
        let app = participation_app!(state_with(command));
        let cookie = login!(app);

        let req = actix_test::TestRequest::put()
            .uri("/api/v1/rounds/2024-01-01/votes")
            .cookie(cookie)
            .set_json(json!({"votes": [{"songId": 1, "score": 5}, {"songId": 2, "score": 1}]}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["message"], "voting is not open for this round");
    }

    #[actix_web::test]
    async fn submission_url_is_validated_before_the_service() {
        let mut command = MockParticipationCommand::new();
        command.expect_submit_cover().never();
        let app = participation_app!(state_with(command));
        let cookie = login!(app);

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/rounds/2024-01-01/submission")
            .cookie(cookie)
            .set_json(json!({"soundcloudUrl": "https://example.com/track"}))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "soundcloudUrl");
    }

    #[actix_web::test]
    async fn my_participation_is_private() {
        let mut command = MockParticipationCommand::new();
        command.expect_my_participation().times(1).returning(|_, _| {
            Ok(MyParticipation {
                phase: Phase::Covering,
                signup: None,
                votes: Vec::new(),
                submission: None,
            })
        });
        let app = participation_app!(state_with(command));
        let cookie = login!(app);

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/rounds/2024-01-01/me")
            .cookie(cookie)
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("Cache-Control")
                .and_then(|v| v.to_str().ok()),
            Some("private, no-cache, must-revalidate")
        );
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["phase"], "covering");
        assert!(body["signup"].is_null());
    }
}
