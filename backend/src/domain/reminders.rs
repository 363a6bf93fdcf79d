//! Reminder email scheduling.
//!
//! The send-reminders job runs periodically; each run asks
//! [`determine_reminders`] which reminders fall due for the current round.
//! The windows are wide enough that a daily run never misses one, and the
//! reminder log stops repeats.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::round::{Phase, RoundMilestones, compute_phase};

const MS_PER_DAY: i64 = 86_400_000;

/// Kind of reminder email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    VotingClosesTomorrow,
    CoveringHalfway,
    CoveringOneMonthLeft,
    CoveringLastWeek,
    CoversDueTomorrow,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 5] = [
        ReminderKind::VotingClosesTomorrow,
        ReminderKind::CoveringHalfway,
        ReminderKind::CoveringOneMonthLeft,
        ReminderKind::CoveringLastWeek,
        ReminderKind::CoversDueTomorrow,
    ];

    /// Value stored in the reminder log.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VotingClosesTomorrow => "voting_closes_tomorrow",
            Self::CoveringHalfway => "covering_halfway",
            Self::CoveringOneMonthLeft => "covering_one_month_left",
            Self::CoveringLastWeek => "covering_last_week",
            Self::CoversDueTomorrow => "covers_due_tomorrow",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// Whether the email content differs for members who already submitted.
    pub fn depends_on_submission(self) -> bool {
        matches!(
            self,
            Self::CoveringOneMonthLeft | Self::CoveringLastWeek | Self::CoversDueTomorrow
        )
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn within_next_two_days(now: DateTime<Utc>, target: DateTime<Utc>) -> bool {
    let remaining = target - now;
    remaining > Duration::zero() && remaining <= Duration::hours(48)
}

/// Whole days until `target`, rounded to the nearest day.
fn rounded_days_until(now: DateTime<Utc>, target: DateTime<Utc>) -> i64 {
    let ms = (target - now).num_milliseconds();
    (ms + MS_PER_DAY / 2).div_euclid(MS_PER_DAY)
}

fn is_halfway(now: DateTime<Utc>, milestones: &RoundMilestones) -> bool {
    let total = (milestones.covers_due() - milestones.covering_begins()).num_milliseconds();
    let elapsed = (now - milestones.covering_begins()).num_milliseconds();
    if total <= 0 || elapsed < 0 {
        return false;
    }
    let scaled = i128::from(elapsed) * 100;
    let total = i128::from(total);
    scaled >= total * 48 && scaled <= total * 52
}

/// Reminders due at `now` for a round.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use eptss::domain::reminders::{determine_reminders, ReminderKind};
/// use eptss::domain::round::{MilestoneDates, RoundMilestones};
///
/// let at = |m, d| Utc.with_ymd_and_hms(2024, m, d, 0, 0, 0).unwrap();
/// let milestones = RoundMilestones::try_new(MilestoneDates {
///     signup_opens: at(1, 1),
///     voting_opens: at(1, 15),
///     covering_begins: at(1, 22),
///     covers_due: at(4, 14),
///     listening_party: at(4, 14),
/// })
/// .unwrap();
/// let due = determine_reminders(at(1, 21), &milestones);
/// assert_eq!(due, vec![ReminderKind::VotingClosesTomorrow]);
/// ```
pub fn determine_reminders(now: DateTime<Utc>, milestones: &RoundMilestones) -> Vec<ReminderKind> {
    let mut due = Vec::new();
    if within_next_two_days(now, milestones.covering_begins()) {
        due.push(ReminderKind::VotingClosesTomorrow);
    }
    if compute_phase(now, milestones) == Phase::Covering {
        if is_halfway(now, milestones) {
            due.push(ReminderKind::CoveringHalfway);
        }
        let days_left = rounded_days_until(now, milestones.covers_due());
        if (28..=32).contains(&days_left) {
            due.push(ReminderKind::CoveringOneMonthLeft);
        }
        if (6..=8).contains(&days_left) {
            due.push(ReminderKind::CoveringLastWeek);
        }
    }
    if within_next_two_days(now, milestones.covers_due()) {
        due.push(ReminderKind::CoversDueTomorrow);
    }
    due
}

/// Outcome of one reminder send, as written to the reminder log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderLogEntry {
    pub kind: ReminderKind,
    pub success: bool,
    pub error_message: Option<String>,
}
