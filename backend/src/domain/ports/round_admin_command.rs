//! Driving port for admin round management.

use async_trait::async_trait;

use crate::domain::round::{MilestonePatch, NewRound, Round, RoundSlug, SongDetails};
use crate::domain::voting::SongTally;
use crate::domain::{Error, Submission, SubmissionDraft, UserId};

use super::{RoundOverview, RoundParticipant};

/// Changes to an existing round. `playlist_url: Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundUpdate {
    pub milestones: MilestonePatch,
    pub playlist_url: Option<Option<String>>,
}

/// Everything an admin needs to run a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub overview: RoundOverview,
    pub participants: Vec<RoundParticipant>,
    pub results: Vec<SongTally>,
    pub submissions: Vec<Submission>,
}

/// Admin-only round operations. Each call names the acting user so the
/// implementation can verify their admin level.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundAdminCommand: Send + Sync {
    async fn create_round(&self, actor: UserId, round: NewRound) -> Result<Round, Error>;

    async fn update_round(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        update: RoundUpdate,
    ) -> Result<Round, Error>;

    /// Assign the round's song, creating it when unknown.
    async fn set_round_song(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        song: SongDetails,
    ) -> Result<Round, Error>;

    async fn round_report(&self, actor: UserId, slug: &RoundSlug) -> Result<RoundReport, Error>;

    /// Record a submission on behalf of a member.
    async fn submit_for_user(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        user_id: UserId,
        draft: SubmissionDraft,
    ) -> Result<Submission, Error>;
}

/// Admin command used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoundAdminCommand;

fn unconfigured() -> Error {
    Error::service_unavailable("round storage is not configured")
}

#[async_trait]
impl RoundAdminCommand for FixtureRoundAdminCommand {
    async fn create_round(&self, _actor: UserId, _round: NewRound) -> Result<Round, Error> {
        Err(unconfigured())
    }

    async fn update_round(
        &self,
        _actor: UserId,
        _slug: &RoundSlug,
        _update: RoundUpdate,
    ) -> Result<Round, Error> {
        Err(unconfigured())
    }

    async fn set_round_song(
        &self,
        _actor: UserId,
        _slug: &RoundSlug,
        _song: SongDetails,
    ) -> Result<Round, Error> {
        Err(unconfigured())
    }

    async fn round_report(&self, _actor: UserId, _slug: &RoundSlug) -> Result<RoundReport, Error> {
        Err(unconfigured())
    }

    async fn submit_for_user(
        &self,
        _actor: UserId,
        _slug: &RoundSlug,
        _user_id: UserId,
        _draft: SubmissionDraft,
    ) -> Result<Submission, Error> {
        Err(unconfigured())
    }
}
