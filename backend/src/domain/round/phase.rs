//! Phase calculation.
//!
//! [`compute_phase`] and [`compute_phase_date_ranges`] are the only places
//! that derive a phase or its dates from milestones. Every consumer (HTTP
//! overviews, participation gating, reminders, song assignment) calls them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::RoundMilestones;

/// Lifecycle phase of a round.
///
/// Ordering follows the lifecycle, so `phase >= Phase::Covering` reads as
/// "voting has closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Signups,
    Voting,
    Covering,
    Celebration,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 4] = [
        Phase::Signups,
        Phase::Voting,
        Phase::Covering,
        Phase::Celebration,
    ];

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Signups => Some(Self::Voting),
            Self::Voting => Some(Self::Covering),
            Self::Covering => Some(Self::Celebration),
            Self::Celebration => None,
        }
    }

    /// Short display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Signups => "Signups",
            Self::Voting => "Voting",
            Self::Covering => "Covering",
            Self::Celebration => "Celebration",
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signups => "signups",
            Self::Voting => "voting",
            Self::Covering => "covering",
            Self::Celebration => "celebration",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine the phase of a round at `now`.
///
/// Boundaries are half-open: the instant a milestone is reached belongs to the
/// phase it opens. Instants before signups report [`Phase::Signups`] and
/// instants after the listening party report [`Phase::Celebration`]; use
/// [`RoundMilestones::window_position`] to tell those apart.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use eptss::domain::round::{compute_phase, MilestoneDates, Phase, RoundMilestones};
///
/// let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap();
/// let milestones = RoundMilestones::try_new(MilestoneDates {
///     signup_opens: at(2022, 11, 17),
///     voting_opens: at(2022, 12, 6),
///     covering_begins: at(2022, 12, 17),
///     covers_due: at(2023, 1, 31),
///     listening_party: at(2023, 2, 8),
/// })
/// .unwrap();
/// assert_eq!(compute_phase(at(2022, 12, 6), &milestones), Phase::Voting);
/// ```
pub fn compute_phase(now: DateTime<Utc>, milestones: &RoundMilestones) -> Phase {
    if now < milestones.voting_opens() {
        Phase::Signups
    } else if now < milestones.covering_begins() {
        Phase::Voting
    } else if now < milestones.covers_due() {
        Phase::Covering
    } else {
        Phase::Celebration
    }
}

/// Inclusive display window of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseWindow {
    pub opens: DateTime<Utc>,
    pub closes: DateTime<Utc>,
}

/// One window per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDateRanges {
    pub signups: PhaseWindow,
    pub voting: PhaseWindow,
    pub covering: PhaseWindow,
    pub celebration: PhaseWindow,
}

impl PhaseDateRanges {
    /// Window for `phase`.
    pub fn window(&self, phase: Phase) -> PhaseWindow {
        match phase {
            Phase::Signups => self.signups,
            Phase::Voting => self.voting,
            Phase::Covering => self.covering,
            Phase::Celebration => self.celebration,
        }
    }
}

/// Compute the display windows for each phase.
///
/// A phase closes one day before the next phase opens. Celebration runs from
/// `covers_due` to `listening_party`.
pub fn compute_phase_date_ranges(milestones: &RoundMilestones) -> PhaseDateRanges {
    let day = Duration::days(1);
    PhaseDateRanges {
        signups: PhaseWindow {
            opens: milestones.signup_opens(),
            closes: milestones.voting_opens() - day,
        },
        voting: PhaseWindow {
            opens: milestones.voting_opens(),
            closes: milestones.covering_begins() - day,
        },
        covering: PhaseWindow {
            opens: milestones.covering_begins(),
            closes: milestones.covers_due() - day,
        },
        celebration: PhaseWindow {
            opens: milestones.covers_due(),
            closes: milestones.listening_party(),
        },
    }
}
