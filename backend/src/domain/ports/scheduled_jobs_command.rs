//! Driving port for the periodic jobs triggered by the cron endpoints.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Error;
use crate::domain::reminders::ReminderKind;
use crate::domain::voting::SongTally;

/// Result of the assign-round-song job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AssignSongOutcome {
    /// Voting is still running.
    NotYetCovering { round: String },
    /// The round already has a song.
    AlreadyAssigned { round: String, song_id: i64 },
    /// Nobody voted.
    NoVotes { round: String },
    /// The winning song was assigned.
    Assigned { round: String, tally: SongTally },
}

/// Result of the create-future-rounds job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureRoundsReport {
    pub skipped_reason: Option<String>,
    pub existing: usize,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<SlugError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugError {
    pub slug: String,
    pub message: String,
}

/// Send counts for one reminder kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderKindReport {
    pub kind: ReminderKind,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of the send-reminder-emails job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRunReport {
    pub round: Option<String>,
    pub skipped_reason: Option<String>,
    pub reminders: Vec<ReminderKindReport>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScheduledJobsCommand: Send + Sync {
    /// Assign the winning song to the current round once covering begins.
    async fn assign_round_song(&self) -> Result<Option<AssignSongOutcome>, Error>;

    /// Keep the configured number of quarterly rounds scheduled ahead.
    async fn create_future_rounds(&self) -> Result<FutureRoundsReport, Error>;

    /// Send due reminder emails for the current round.
    async fn send_reminder_emails(&self) -> Result<ReminderRunReport, Error>;
}

/// Job runner used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureScheduledJobsCommand;

#[async_trait]
impl ScheduledJobsCommand for FixtureScheduledJobsCommand {
    async fn assign_round_song(&self) -> Result<Option<AssignSongOutcome>, Error> {
        Ok(None)
    }

    async fn create_future_rounds(&self) -> Result<FutureRoundsReport, Error> {
        Ok(FutureRoundsReport {
            skipped_reason: Some("no current round".to_owned()),
            ..FutureRoundsReport::default()
        })
    }

    async fn send_reminder_emails(&self) -> Result<ReminderRunReport, Error> {
        Ok(ReminderRunReport {
            skipped_reason: Some("no current round".to_owned()),
            ..ReminderRunReport::default()
        })
    }
}
