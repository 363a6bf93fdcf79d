//! Driving port for member participation in a round.

use async_trait::async_trait;

use crate::domain::round::{Phase, RoundSlug};
use crate::domain::voting::{Ballot, StoredVote};
use crate::domain::{Error, Signup, SignupDraft, Submission, SubmissionDraft, UserId};

/// A member's state in one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyParticipation {
    pub phase: Phase,
    pub signup: Option<Signup>,
    pub votes: Vec<StoredVote>,
    pub submission: Option<Submission>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipationCommand: Send + Sync {
    /// Sign up with a song suggestion; replaces an earlier signup.
    async fn sign_up(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        draft: SignupDraft,
    ) -> Result<Signup, Error>;

    /// Cast or replace the member's ballot.
    async fn vote(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        ballot: Ballot,
    ) -> Result<Vec<StoredVote>, Error>;

    /// Submit or replace the member's cover.
    async fn submit_cover(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        draft: SubmissionDraft,
    ) -> Result<Submission, Error>;

    async fn my_participation(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
    ) -> Result<MyParticipation, Error>;
}

/// Participation command used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureParticipationCommand;

fn unconfigured() -> Error {
    Error::service_unavailable("round storage is not configured")
}

#[async_trait]
impl ParticipationCommand for FixtureParticipationCommand {
    async fn sign_up(
        &self,
        _user_id: UserId,
        _slug: &RoundSlug,
        _draft: SignupDraft,
    ) -> Result<Signup, Error> {
        Err(unconfigured())
    }

    async fn vote(
        &self,
        _user_id: UserId,
        _slug: &RoundSlug,
        _ballot: Ballot,
    ) -> Result<Vec<StoredVote>, Error> {
        Err(unconfigured())
    }

    async fn submit_cover(
        &self,
        _user_id: UserId,
        _slug: &RoundSlug,
        _draft: SubmissionDraft,
    ) -> Result<Submission, Error> {
        Err(unconfigured())
    }

    async fn my_participation(
        &self,
        _user_id: UserId,
        _slug: &RoundSlug,
    ) -> Result<MyParticipation, Error> {
        Err(unconfigured())
    }
}
