//! Port for the reminder email log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;
use crate::domain::reminders::{ReminderKind, ReminderLogEntry};
use crate::domain::round::RoundId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by reminder log adapters.
    pub enum ReminderLogRepositoryError {
        Connection { message: String } => "reminder log connection failed: {message}",
        Query { message: String } => "reminder log query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderLogRepository: Send + Sync {
    /// Whether a successful send is already recorded.
    async fn has_successful(
        &self,
        round_id: RoundId,
        user_id: UserId,
        kind: ReminderKind,
    ) -> Result<bool, ReminderLogRepositoryError>;

    /// Record a send attempt. A repeated success for the same round, member
    /// and kind is ignored.
    async fn record(
        &self,
        round_id: RoundId,
        user_id: UserId,
        entry: &ReminderLogEntry,
        now: DateTime<Utc>,
    ) -> Result<(), ReminderLogRepositoryError>;
}
