//! Port for round signups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::round::{RoundId, Song};
use crate::domain::{Signup, SignupDraft, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by signup repository adapters.
    pub enum SignupRepositoryError {
        Connection { message: String } => "signup repository connection failed: {message}",
        Query { message: String } => "signup repository query failed: {message}",
    }
}

/// A signup together with the member who made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundParticipant {
    pub signup: Signup,
    pub user: User,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupRepository: Send + Sync {
    /// Find or create the suggested song and insert or replace the member's
    /// signup in one transaction.
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SignupDraft,
        now: DateTime<Utc>,
    ) -> Result<Signup, SignupRepositoryError>;

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Signup>, SignupRepositoryError>;

    /// Signups for a round with their members, oldest first.
    async fn list_participants(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<RoundParticipant>, SignupRepositoryError>;

    async fn count_for_round(&self, round_id: RoundId) -> Result<usize, SignupRepositoryError>;

    /// Distinct songs suggested for a round, ordered by title.
    async fn voting_options(&self, round_id: RoundId) -> Result<Vec<Song>, SignupRepositoryError>;
}
