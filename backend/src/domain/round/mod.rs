//! Rounds and their phase state machine.
//!
//! A round moves through `signups → voting → covering → celebration`. The
//! phase is always derived from the five milestone dates and the current
//! time; it is never stored.

mod labels;
mod milestones;
mod model;
mod phase;
mod timeline;

pub use self::labels::{format_phase_label, ordinal_suffix};
pub use self::milestones::{
    MilestoneDates, MilestoneOrderError, MilestonePatch, RoundMilestones, WindowPosition,
};
pub use self::model::{
    NewRound, ROUND_SLUG_MAX, Round, RoundId, RoundSlug, RoundSlugError, SONG_FIELD_MAX, Song,
    SongDetails, SongId, SongValidationError,
};
pub use self::phase::{Phase, PhaseDateRanges, PhaseWindow, compute_phase, compute_phase_date_ranges};
pub use self::timeline::{PhaseLabels, PhaseWindowLabels, RoundTimeline};

#[cfg(test)]
mod tests;
