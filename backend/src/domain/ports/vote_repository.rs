//! Port for ballots.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;
use crate::domain::round::RoundId;
use crate::domain::voting::{Ballot, StoredVote};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote repository adapters.
    pub enum VoteRepositoryError {
        Connection { message: String } => "vote repository connection failed: {message}",
        Query { message: String } => "vote repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Delete the member's votes for the round and insert the ballot, in one
    /// transaction.
    async fn replace_ballot(
        &self,
        round_id: RoundId,
        user_id: UserId,
        ballot: &Ballot,
        now: DateTime<Utc>,
    ) -> Result<(), VoteRepositoryError>;

    async fn list_for_round(&self, round_id: RoundId) -> Result<Vec<StoredVote>, VoteRepositoryError>;

    async fn list_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Vec<StoredVote>, VoteRepositoryError>;
}
