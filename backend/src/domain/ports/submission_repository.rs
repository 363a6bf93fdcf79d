//! Port for cover submissions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::round::RoundId;
use crate::domain::{Submission, SubmissionDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by submission repository adapters.
    pub enum SubmissionRepositoryError {
        Connection { message: String } => "submission repository connection failed: {message}",
        Query { message: String } => "submission repository query failed: {message}",
        /// The member already submitted a cover for the round.
        Duplicate { round_id: i64 } => "a submission already exists for round {round_id}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Insert or replace the member's submission.
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError>;

    /// Insert a submission, failing with `Duplicate` when one exists.
    async fn insert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError>;

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError>;

    /// Submissions for a round, oldest first.
    async fn list_for_round(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;
}
