//! Helpers shared by the domain services: port error mapping, round lookup
//! and authorisation checks.

use chrono::{DateTime, Utc};

use crate::domain::ports::{
    LoginTokenRepositoryError, ReminderLogRepositoryError, Repositories, RoundOverview,
    RoundRepositoryError, SignupRepositoryError, SongRepositoryError, SubmissionRepositoryError,
    UserPersistenceError, VoteRepositoryError,
};
use crate::domain::round::{Round, RoundSlug, RoundTimeline};
use crate::domain::{Error, User, UserId};

pub(crate) fn map_round_error(error: RoundRepositoryError) -> Error {
    match error {
        RoundRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round repository unavailable: {message}"))
        }
        RoundRepositoryError::Query { message } => {
            Error::internal(format!("round repository error: {message}"))
        }
        RoundRepositoryError::DuplicateSlug { slug } => {
            Error::conflict(format!("a round with slug {slug} already exists"))
        }
        RoundRepositoryError::InvalidRow { message } => {
            Error::internal(format!("stored round is invalid: {message}"))
        }
        RoundRepositoryError::Missing { round_id } => {
            Error::not_found(format!("round {round_id} not found"))
        }
    }
}

pub(crate) fn map_song_error(error: SongRepositoryError) -> Error {
    match error {
        SongRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("song repository unavailable: {message}"))
        }
        SongRepositoryError::Query { message } => {
            Error::internal(format!("song repository error: {message}"))
        }
    }
}

pub(crate) fn map_signup_error(error: SignupRepositoryError) -> Error {
    match error {
        SignupRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("signup repository unavailable: {message}"))
        }
        SignupRepositoryError::Query { message } => {
            Error::internal(format!("signup repository error: {message}"))
        }
    }
}

pub(crate) fn map_vote_error(error: VoteRepositoryError) -> Error {
    match error {
        VoteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("vote repository unavailable: {message}"))
        }
        VoteRepositoryError::Query { message } => {
            Error::internal(format!("vote repository error: {message}"))
        }
    }
}

pub(crate) fn map_submission_error(error: SubmissionRepositoryError) -> Error {
    match error {
        SubmissionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("submission repository unavailable: {message}"))
        }
        SubmissionRepositoryError::Query { message } => {
            Error::internal(format!("submission repository error: {message}"))
        }
        SubmissionRepositoryError::Duplicate { .. } => {
            Error::conflict("this member has already submitted a cover for the round")
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => Error::conflict("email is already registered")
            .with_details(serde_json::json!({ "field": "email", "code": "duplicate" })),
        UserPersistenceError::DuplicateUsername => Error::conflict("username is already taken")
            .with_details(serde_json::json!({ "field": "username", "code": "duplicate" })),
        UserPersistenceError::InvalidRow { message } => {
            Error::internal(format!("stored user is invalid: {message}"))
        }
    }
}

pub(crate) fn map_login_token_error(error: LoginTokenRepositoryError) -> Error {
    match error {
        LoginTokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("login token repository unavailable: {message}"))
        }
        LoginTokenRepositoryError::Query { message } => {
            Error::internal(format!("login token repository error: {message}"))
        }
    }
}

pub(crate) fn map_reminder_log_error(error: ReminderLogRepositoryError) -> Error {
    match error {
        ReminderLogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reminder log unavailable: {message}"))
        }
        ReminderLogRepositoryError::Query { message } => {
            Error::internal(format!("reminder log error: {message}"))
        }
    }
}

pub(crate) async fn find_round(repos: &Repositories, slug: &RoundSlug) -> Result<Round, Error> {
    repos
        .rounds
        .find_by_slug(slug)
        .await
        .map_err(map_round_error)?
        .ok_or_else(|| Error::not_found(format!("round {slug} not found")))
}

/// The round open at `now`, else the next upcoming round.
pub(crate) async fn current_round(
    repos: &Repositories,
    now: DateTime<Utc>,
) -> Result<Option<Round>, Error> {
    if let Some(round) = repos.rounds.find_open_at(now).await.map_err(map_round_error)? {
        return Ok(Some(round));
    }
    repos
        .rounds
        .find_next_upcoming(now)
        .await
        .map_err(map_round_error)
}

pub(crate) async fn overview(
    repos: &Repositories,
    round: Round,
    now: DateTime<Utc>,
) -> Result<RoundOverview, Error> {
    let signup_count = repos
        .signups
        .count_for_round(round.id)
        .await
        .map_err(map_signup_error)?;
    let submission_count = repos
        .submissions
        .list_for_round(round.id)
        .await
        .map_err(map_submission_error)?
        .len();
    Ok(RoundOverview {
        timeline: RoundTimeline::at(now, &round.milestones),
        round,
        signup_count,
        submission_count,
    })
}

/// Load the account behind a session; a vanished account is treated as
/// logged out.
pub(crate) async fn require_user(repos: &Repositories, user_id: UserId) -> Result<User, Error> {
    repos
        .users
        .find_by_id(&user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::unauthorized("login required"))
}

pub(crate) async fn require_admin(repos: &Repositories, actor: UserId) -> Result<User, Error> {
    let user = require_user(repos, actor).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Error::forbidden("admin access required"))
    }
}
