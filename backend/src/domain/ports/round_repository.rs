//! Port for round persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::round::{NewRound, Round, RoundId, RoundMilestones, RoundSlug, SongId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by round repository adapters.
    pub enum RoundRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "round repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "round repository query failed: {message}",
        /// A round with the same slug already exists.
        DuplicateSlug { slug: String } => "round slug {slug} already exists",
        /// A stored row violates round invariants.
        InvalidRow { message: String } => "stored round is invalid: {message}",
        /// The round to update does not exist.
        Missing { round_id: i64 } => "round {round_id} does not exist",
    }
}

/// Round storage.
///
/// Listing methods return rounds with their assigned song, if any.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundRepository: Send + Sync {
    /// Fetch a round by slug.
    async fn find_by_slug(&self, slug: &RoundSlug) -> Result<Option<Round>, RoundRepositoryError>;

    /// All rounds, newest `signup_opens` first.
    async fn list_all(&self) -> Result<Vec<Round>, RoundRepositoryError>;

    /// The round open at `now` (`signup_opens <= now <= listening_party`)
    /// with the earliest listening party.
    async fn find_open_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Round>, RoundRepositoryError>;

    /// The round with the smallest `signup_opens` strictly after `now`.
    async fn find_next_upcoming(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Round>, RoundRepositoryError>;

    /// Rounds whose voting opens strictly after `voting_opens`, ascending.
    async fn list_voting_after(
        &self,
        voting_opens: DateTime<Utc>,
    ) -> Result<Vec<Round>, RoundRepositoryError>;

    /// Insert a round.
    async fn insert(&self, round: &NewRound) -> Result<Round, RoundRepositoryError>;

    /// Replace a round's milestones and playlist link.
    async fn update(
        &self,
        round_id: RoundId,
        milestones: &RoundMilestones,
        playlist_url: Option<String>,
    ) -> Result<Round, RoundRepositoryError>;

    /// Assign the song everyone will cover.
    async fn set_song(&self, round_id: RoundId, song_id: SongId) -> Result<(), RoundRepositoryError>;
}
