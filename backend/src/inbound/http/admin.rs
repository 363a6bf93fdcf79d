//! Admin round management HTTP handlers.
//!
//! ```text
//! POST  /api/v1/admin/rounds
//! PATCH /api/v1/admin/rounds/{slug}
//! PUT   /api/v1/admin/rounds/{slug}/song
//! GET   /api/v1/admin/rounds/{slug}/report
//! POST  /api/v1/admin/rounds/{slug}/submissions
//! ```
//!
//! The session identifies the actor; the admin service checks the admin
//! level and answers `403` for members.

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::User;
use crate::domain::ports::{RoundParticipant, RoundReport, RoundUpdate};
use crate::domain::round::{MilestoneDates, MilestonePatch, NewRound, RoundMilestones, SongDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::participation::SubmissionRequest;
use crate::inbound::http::rounds_dto::{
    RoundResponse, SignupResponse, SongTallyResponse, StoredRoundResponse, SubmissionResponse,
};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, milestone_error, parse_optional_rfc3339_timestamp, parse_rfc3339_timestamp,
    parse_slug, parse_user_id, require, song_error,
};

const SIGNUP_OPENS: FieldName = FieldName::new("signupOpens");
const VOTING_OPENS: FieldName = FieldName::new("votingOpens");
const COVERING_BEGINS: FieldName = FieldName::new("coveringBegins");
const COVERS_DUE: FieldName = FieldName::new("coversDue");
const LISTENING_PARTY: FieldName = FieldName::new("listeningParty");

/// New round with all five milestones as RFC 3339 timestamps.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoundRequest {
    #[schema(example = "2024-04-01")]
    pub slug: Option<String>,
    pub playlist_url: Option<String>,
    #[schema(example = "2024-04-01T00:00:00Z")]
    pub signup_opens: Option<String>,
    pub voting_opens: Option<String>,
    pub covering_begins: Option<String>,
    pub covers_due: Option<String>,
    pub listening_party: Option<String>,
}

fn normalise_playlist(url: Option<String>) -> Option<String> {
    url.map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
}

impl CreateRoundRequest {
    fn into_new_round(self) -> ApiResult<NewRound> {
        let slug = parse_slug(require(self.slug, FieldName::new("slug"))?)?;
        let dates = MilestoneDates {
            signup_opens: parse_rfc3339_timestamp(
                require(self.signup_opens, SIGNUP_OPENS)?,
                SIGNUP_OPENS,
            )?,
            voting_opens: parse_rfc3339_timestamp(
                require(self.voting_opens, VOTING_OPENS)?,
                VOTING_OPENS,
            )?,
            covering_begins: parse_rfc3339_timestamp(
                require(self.covering_begins, COVERING_BEGINS)?,
                COVERING_BEGINS,
            )?,
            covers_due: parse_rfc3339_timestamp(require(self.covers_due, COVERS_DUE)?, COVERS_DUE)?,
            listening_party: parse_rfc3339_timestamp(
                require(self.listening_party, LISTENING_PARTY)?,
                LISTENING_PARTY,
            )?,
        };
        Ok(NewRound {
            slug,
            playlist_url: normalise_playlist(self.playlist_url),
            milestones: RoundMilestones::try_new(dates).map_err(milestone_error)?,
        })
    }
}

/// Distinguish an absent field from an explicit `null`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Partial round update. Omitted milestones keep their value; a `null`
/// playlist URL clears it.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoundRequest {
    pub signup_opens: Option<String>,
    pub voting_opens: Option<String>,
    pub covering_begins: Option<String>,
    pub covers_due: Option<String>,
    pub listening_party: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub playlist_url: Option<Option<String>>,
}

impl UpdateRoundRequest {
    fn into_update(self) -> ApiResult<RoundUpdate> {
        Ok(RoundUpdate {
            milestones: MilestonePatch {
                signup_opens: parse_optional_rfc3339_timestamp(self.signup_opens, SIGNUP_OPENS)?,
                voting_opens: parse_optional_rfc3339_timestamp(self.voting_opens, VOTING_OPENS)?,
                covering_begins: parse_optional_rfc3339_timestamp(
                    self.covering_begins,
                    COVERING_BEGINS,
                )?,
                covers_due: parse_optional_rfc3339_timestamp(self.covers_due, COVERS_DUE)?,
                listening_party: parse_optional_rfc3339_timestamp(
                    self.listening_party,
                    LISTENING_PARTY,
                )?,
            },
            playlist_url: self.playlist_url.map(normalise_playlist),
        })
    }
}

/// Song chosen by an admin, overriding the vote.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Submission recorded on behalf of a member.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSubmissionRequest {
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub submission: SubmissionRequest,
}

/// Signup together with the member who made it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    #[schema(value_type = UserSchema)]
    pub user: User,
    pub signup: SignupResponse,
}

impl From<RoundParticipant> for ParticipantResponse {
    fn from(value: RoundParticipant) -> Self {
        Self {
            user: value.user,
            signup: value.signup.into(),
        }
    }
}

/// Everything an admin sees about one round.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundReportResponse {
    pub round: RoundResponse,
    pub participants: Vec<ParticipantResponse>,
    pub results: Vec<SongTallyResponse>,
    pub submissions: Vec<SubmissionResponse>,
}

impl From<RoundReport> for RoundReportResponse {
    fn from(report: RoundReport) -> Self {
        Self {
            round: report.overview.into(),
            participants: report
                .participants
                .into_iter()
                .map(ParticipantResponse::from)
                .collect(),
            results: report
                .results
                .into_iter()
                .map(SongTallyResponse::from)
                .collect(),
            submissions: report
                .submissions
                .into_iter()
                .map(SubmissionResponse::from)
                .collect(),
        }
    }
}

/// Create a round.
#[utoipa::path(
    post,
    path = "/api/v1/admin/rounds",
    request_body = CreateRoundRequest,
    responses(
        (status = 201, description = "Created round", body = StoredRoundResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 409, description = "Slug already exists", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createRound"
)]
#[post("/admin/rounds")]
pub async fn create_round(
    state: web::Data<HttpState>,
    session: MemberSession,
    payload: web::Json<CreateRoundRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.member()?;
    let new_round = payload.into_inner().into_new_round()?;
    let round = state.round_admin.create_round(actor, new_round).await?;
    Ok(HttpResponse::Created().json(StoredRoundResponse::from(round)))
}

/// Patch a round's milestones or playlist.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/rounds/{slug}",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = UpdateRoundRequest,
    responses(
        (status = 200, description = "Updated round", body = StoredRoundResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateRound"
)]
#[patch("/admin/rounds/{slug}")]
pub async fn update_round(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<UpdateRoundRequest>,
) -> ApiResult<web::Json<StoredRoundResponse>> {
    let actor = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let update = payload.into_inner().into_update()?;
    let round = state.round_admin.update_round(actor, &slug, update).await?;
    Ok(web::Json(round.into()))
}

/// Set the round's song directly.
#[utoipa::path(
    put,
    path = "/api/v1/admin/rounds/{slug}/song",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = SetSongRequest,
    responses(
        (status = 200, description = "Updated round", body = StoredRoundResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setRoundSong"
)]
#[put("/admin/rounds/{slug}/song")]
pub async fn set_round_song(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<SetSongRequest>,
) -> ApiResult<web::Json<StoredRoundResponse>> {
    let actor = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let SetSongRequest { title, artist } = payload.into_inner();
    let title = require(title, FieldName::new("title"))?;
    let artist = require(artist, FieldName::new("artist"))?;
    let song = SongDetails::try_new(&title, &artist).map_err(song_error)?;
    let round = state.round_admin.set_round_song(actor, &slug, song).await?;
    Ok(web::Json(round.into()))
}

/// Participants, results and submissions for a round.
#[utoipa::path(
    get,
    path = "/api/v1/admin/rounds/{slug}/report",
    params(("slug" = String, Path, description = "Round slug")),
    responses(
        (status = 200, description = "Round report", body = RoundReportResponse),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getRoundReport"
)]
#[get("/admin/rounds/{slug}/report")]
pub async fn round_report(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let report = state.round_admin.round_report(actor, &slug).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(RoundReportResponse::from(report)))
}

/// Record a cover on a member's behalf, whatever the phase.
#[utoipa::path(
    post,
    path = "/api/v1/admin/rounds/{slug}/submissions",
    params(("slug" = String, Path, description = "Round slug")),
    request_body = AdminSubmissionRequest,
    responses(
        (status = 201, description = "Stored submission", body = SubmissionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Admin access required", body = ErrorSchema),
        (status = 404, description = "Round or user not found", body = ErrorSchema),
        (status = 409, description = "Member already submitted", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminSubmitCover"
)]
#[post("/admin/rounds/{slug}/submissions")]
pub async fn submit_for_user(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
    payload: web::Json<AdminSubmissionRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.member()?;
    let slug = parse_slug(path.into_inner())?;
    let AdminSubmissionRequest {
        user_id,
        submission,
    } = payload.into_inner();
    let user_id = parse_user_id(
        &require(user_id, FieldName::new("userId"))?,
        FieldName::new("userId"),
    )?;
    let draft = submission.into_draft()?;
    let stored = state
        .round_admin
        .submit_for_user(actor, &slug, user_id, draft)
        .await?;
    Ok(HttpResponse::Created().json(SubmissionResponse::from(stored)))
}
