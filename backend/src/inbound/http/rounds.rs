//! Public round HTTP handlers.
//!
//! ```text
//! GET /api/v1/rounds
//! GET /api/v1/rounds/current
//! GET /api/v1/rounds/future
//! GET /api/v1/rounds/{slug}
//! GET /api/v1/rounds/{slug}/voting-options
//! GET /api/v1/rounds/{slug}/results
//! ```
//!
//! Reads need no session. Results reveal only aggregates, and only once
//! voting has closed unless the viewer is an admin.

use actix_web::{get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::rounds_dto::{RoundResponse, SongResponse, SongTallyResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_slug;

/// The round whose lifetime contains the present, or the most recent one.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/current",
    responses(
        (status = 200, description = "Current round", body = RoundResponse),
        (status = 404, description = "No rounds exist", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "getCurrentRound",
    security([])
)]
#[get("/rounds/current")]
pub async fn current_round(state: web::Data<HttpState>) -> ApiResult<web::Json<RoundResponse>> {
    let overview = state.rounds.current_round().await?;
    Ok(web::Json(overview.into()))
}

/// Rounds that have already started, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rounds",
    responses(
        (status = 200, description = "Started rounds", body = [RoundResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "listRounds",
    security([])
)]
#[get("/rounds")]
pub async fn list_rounds(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<RoundResponse>>> {
    let rounds = state.rounds.list_rounds().await?;
    Ok(web::Json(rounds.into_iter().map(RoundResponse::from).collect()))
}

/// Scheduled rounds whose signups have not opened yet.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/future",
    responses(
        (status = 200, description = "Upcoming rounds", body = [RoundResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "listFutureRounds",
    security([])
)]
#[get("/rounds/future")]
pub async fn future_rounds(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<RoundResponse>>> {
    let rounds = state.rounds.future_rounds().await?;
    Ok(web::Json(rounds.into_iter().map(RoundResponse::from).collect()))
}

/// One round with its phase timeline.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/{slug}",
    params(("slug" = String, Path, description = "Round slug, e.g. 2024-01-01")),
    responses(
        (status = 200, description = "Round", body = RoundResponse),
        (status = 400, description = "Invalid slug", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "getRound",
    security([])
)]
#[get("/rounds/{slug}")]
pub async fn get_round(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoundResponse>> {
    let slug = parse_slug(path.into_inner())?;
    let overview = state.rounds.round_overview(&slug).await?;
    Ok(web::Json(overview.into()))
}

/// Songs suggested during signups, in title order.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/{slug}/voting-options",
    params(("slug" = String, Path, description = "Round slug")),
    responses(
        (status = 200, description = "Voting options", body = [SongResponse]),
        (status = 400, description = "Invalid slug", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "getVotingOptions",
    security([])
)]
#[get("/rounds/{slug}/voting-options")]
pub async fn voting_options(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SongResponse>>> {
    let slug = parse_slug(path.into_inner())?;
    let songs = state.rounds.voting_options(&slug).await?;
    Ok(web::Json(songs.into_iter().map(SongResponse::from).collect()))
}

/// Ranked vote tallies.
#[utoipa::path(
    get,
    path = "/api/v1/rounds/{slug}/results",
    params(("slug" = String, Path, description = "Round slug")),
    responses(
        (status = 200, description = "Tallies, best first", body = [SongTallyResponse]),
        (status = 400, description = "Invalid slug", body = ErrorSchema),
        (status = 404, description = "Round not found", body = ErrorSchema),
        (status = 403, description = "Results hidden until covering begins", body = ErrorSchema)
    ),
    tags = ["rounds"],
    operation_id = "getVoteResults",
    security([], ("SessionCookie" = []))
)]
#[get("/rounds/{slug}/results")]
pub async fn vote_results(
    state: web::Data<HttpState>,
    session: MemberSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<SongTallyResponse>>> {
    let slug = parse_slug(path.into_inner())?;
    let viewer = session.viewer()?;
    let tallies = state.rounds.vote_results(&slug, viewer).await?;
    Ok(web::Json(
        tallies.into_iter().map(SongTallyResponse::from).collect(),
    ))
}
