//! Snapshot of a round's phase state at a given instant.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    MilestoneDates, Phase, PhaseDateRanges, PhaseWindow, RoundMilestones, WindowPosition,
    compute_phase, compute_phase_date_ranges, format_phase_label,
};

/// Preformatted labels for one phase window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseWindowLabels {
    pub opens: String,
    pub closes: String,
}

impl From<PhaseWindow> for PhaseWindowLabels {
    fn from(window: PhaseWindow) -> Self {
        Self {
            opens: format_phase_label(window.opens),
            closes: format_phase_label(window.closes),
        }
    }
}

/// Labels for every phase window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseLabels {
    pub signups: PhaseWindowLabels,
    pub voting: PhaseWindowLabels,
    pub covering: PhaseWindowLabels,
    pub celebration: PhaseWindowLabels,
}

/// Phase, window position, date ranges and labels of a round at `now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTimeline {
    pub phase: Phase,
    pub window_position: WindowPosition,
    pub milestones: MilestoneDates,
    pub date_ranges: PhaseDateRanges,
    pub labels: PhaseLabels,
}

impl RoundTimeline {
    pub fn at(now: DateTime<Utc>, milestones: &RoundMilestones) -> Self {
        let date_ranges = compute_phase_date_ranges(milestones);
        Self {
            phase: compute_phase(now, milestones),
            window_position: milestones.window_position(now),
            milestones: milestones.dates(),
            date_ranges,
            labels: PhaseLabels {
                signups: date_ranges.signups.into(),
                voting: date_ranges.voting.into(),
                covering: date_ranges.covering.into(),
                celebration: date_ranges.celebration.into(),
            },
        }
    }

    /// Labels for the phase the round is in.
    pub fn current_labels(&self) -> &PhaseWindowLabels {
        match self.phase {
            Phase::Signups => &self.labels.signups,
            Phase::Voting => &self.labels.voting,
            Phase::Covering => &self.labels.covering,
            Phase::Celebration => &self.labels.celebration,
        }
    }
}
