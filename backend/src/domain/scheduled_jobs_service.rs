//! Periodic jobs: assigning the winning song, scheduling future rounds and
//! sending reminder emails.
//!
//! Each job works on the current round as resolved by the read side (open
//! round, else next upcoming) and returns a report rather than failing on
//! per-item problems.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::Error;
use crate::domain::notifications::Notifier;
use crate::domain::ports::{
    AssignSongOutcome, FutureRoundsReport, ReminderKindReport, ReminderRunReport, Repositories,
    RoundParticipant, RoundRepositoryError, ScheduledJobsCommand, SlugError,
};
use crate::domain::reminders::{ReminderKind, ReminderLogEntry, determine_reminders};
use crate::domain::round::{NewRound, Round};
use crate::domain::schedule::next_quarterly_rounds;
use crate::domain::service_support::{
    current_round, map_reminder_log_error, map_round_error, map_signup_error,
    map_submission_error, map_vote_error,
};
use crate::domain::voting::{select_winner, tally_votes};

/// Number of rounds kept scheduled beyond the current one.
pub const REQUIRED_FUTURE_ROUNDS: usize = 2;

const NO_CURRENT_ROUND: &str = "no current round";

#[derive(Clone)]
pub struct ScheduledJobsService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl ScheduledJobsService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>, notifier: Notifier) -> Self {
        Self {
            repos,
            clock,
            notifier,
        }
    }

    async fn send_reminder_kind(
        &self,
        round: &Round,
        kind: ReminderKind,
        participants: &[RoundParticipant],
    ) -> Result<ReminderKindReport, Error> {
        let mut report = ReminderKindReport {
            kind,
            sent: 0,
            skipped: 0,
            failed: 0,
        };
        for participant in participants {
            let user = &participant.user;
            let already_sent = self
                .repos
                .reminder_log
                .has_successful(round.id, user.id, kind)
                .await
                .map_err(map_reminder_log_error)?;
            if already_sent {
                report.skipped += 1;
                continue;
            }
            let has_submitted = if kind.depends_on_submission() {
                self.repos
                    .submissions
                    .find_for_user(round.id, user.id)
                    .await
                    .map_err(map_submission_error)?
                    .is_some()
            } else {
                false
            };
            let message = self
                .notifier
                .templates()
                .reminder(kind, user, round, has_submitted);
            let entry = match self.notifier.send(&message).await {
                Ok(_) => {
                    report.sent += 1;
                    ReminderLogEntry {
                        kind,
                        success: true,
                        error_message: None,
                    }
                }
                Err(error) => {
                    warn!(user = %user.id, %kind, %error, "reminder delivery failed");
                    report.failed += 1;
                    ReminderLogEntry {
                        kind,
                        success: false,
                        error_message: Some(error.to_string()),
                    }
                }
            };
            self.repos
                .reminder_log
                .record(round.id, user.id, &entry, self.clock.utc())
                .await
                .map_err(map_reminder_log_error)?;
        }
        Ok(report)
    }
}

#[async_trait]
impl ScheduledJobsCommand for ScheduledJobsService {
    async fn assign_round_song(&self) -> Result<Option<AssignSongOutcome>, Error> {
        let now = self.clock.utc();
        let Some(round) = current_round(&self.repos, now).await? else {
            info!("song assignment skipped: {NO_CURRENT_ROUND}");
            return Ok(None);
        };
        let slug = round.slug.to_string();
        if now < round.milestones.covering_begins() {
            return Ok(Some(AssignSongOutcome::NotYetCovering { round: slug }));
        }
        if let Some(song) = &round.song {
            return Ok(Some(AssignSongOutcome::AlreadyAssigned {
                round: slug,
                song_id: song.id.0,
            }));
        }
        let votes = self
            .repos
            .votes
            .list_for_round(round.id)
            .await
            .map_err(map_vote_error)?;
        let Some(winner) = select_winner(&tally_votes(&votes)) else {
            info!(round = %slug, "no votes cast; song left unassigned");
            return Ok(Some(AssignSongOutcome::NoVotes { round: slug }));
        };
        self.repos
            .rounds
            .set_song(round.id, winner.song.id)
            .await
            .map_err(map_round_error)?;
        info!(round = %slug, song_id = %winner.song.id, "round song assigned");
        if let Some(admin_email) = self.notifier.admin_email() {
            self.notifier
                .send_best_effort(
                    self.notifier
                        .templates()
                        .admin_song_assigned(admin_email, &round, &winner),
                    "admin_song_assigned",
                )
                .await;
        }
        Ok(Some(AssignSongOutcome::Assigned {
            round: slug,
            tally: winner,
        }))
    }

    async fn create_future_rounds(&self) -> Result<FutureRoundsReport, Error> {
        let now = self.clock.utc();
        let Some(current) = current_round(&self.repos, now).await? else {
            return Ok(FutureRoundsReport {
                skipped_reason: Some(NO_CURRENT_ROUND.to_owned()),
                ..FutureRoundsReport::default()
            });
        };
        let existing = self
            .repos
            .rounds
            .list_voting_after(current.milestones.voting_opens())
            .await
            .map_err(map_round_error)?;
        let mut report = FutureRoundsReport {
            existing: existing.len(),
            ..FutureRoundsReport::default()
        };
        let missing = REQUIRED_FUTURE_ROUNDS.saturating_sub(existing.len());
        if missing == 0 {
            return Ok(report);
        }
        let anchor = existing
            .last()
            .unwrap_or(&current)
            .milestones
            .voting_opens();
        let plans = next_quarterly_rounds(anchor, missing, now)
            .map_err(|error| Error::internal(format!("round planning failed: {error}")))?;
        for plan in plans {
            let slug = plan.slug.to_string();
            let round = NewRound {
                slug: plan.slug,
                playlist_url: None,
                milestones: plan.milestones,
            };
            match self.repos.rounds.insert(&round).await {
                Ok(_) => {
                    info!(round = %slug, "future round created");
                    report.created.push(slug);
                }
                Err(RoundRepositoryError::DuplicateSlug { .. }) => report.skipped.push(slug),
                Err(error) => {
                    warn!(round = %slug, %error, "future round creation failed");
                    report.errors.push(SlugError {
                        slug,
                        message: error.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    async fn send_reminder_emails(&self) -> Result<ReminderRunReport, Error> {
        let now = self.clock.utc();
        let Some(round) = current_round(&self.repos, now).await? else {
            return Ok(ReminderRunReport {
                skipped_reason: Some(NO_CURRENT_ROUND.to_owned()),
                ..ReminderRunReport::default()
            });
        };
        let kinds = determine_reminders(now, &round.milestones);
        let mut report = ReminderRunReport {
            round: Some(round.slug.to_string()),
            ..ReminderRunReport::default()
        };
        if kinds.is_empty() {
            report.skipped_reason = Some("no reminders due".to_owned());
            return Ok(report);
        }
        let participants = self
            .repos
            .signups
            .list_participants(round.id)
            .await
            .map_err(map_signup_error)?;
        for kind in kinds {
            let kind_report = self.send_reminder_kind(&round, kind, &participants).await?;
            info!(
                round = %round.slug,
                %kind,
                sent = kind_report.sent,
                skipped = kind_report.skipped,
                failed = kind_report.failed,
                "reminders processed"
            );
            report.reminders.push(kind_report);
        }
        Ok(report)
    }
}
