//! Validated milestone dates for a round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw milestone dates as supplied by an admin form or a database row.
///
/// Field order matches the round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDates {
    pub signup_opens: DateTime<Utc>,
    pub voting_opens: DateTime<Utc>,
    pub covering_begins: DateTime<Utc>,
    pub covers_due: DateTime<Utc>,
    pub listening_party: DateTime<Utc>,
}

/// Partial milestone update; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MilestonePatch {
    pub signup_opens: Option<DateTime<Utc>>,
    pub voting_opens: Option<DateTime<Utc>>,
    pub covering_begins: Option<DateTime<Utc>>,
    pub covers_due: Option<DateTime<Utc>>,
    pub listening_party: Option<DateTime<Utc>>,
}

impl MilestonePatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Milestone pair that violates lifecycle ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MilestoneOrderError {
    #[error("dates are in incorrect order: signupOpens must not be after votingOpens")]
    SignupAfterVoting,
    #[error("dates are in incorrect order: votingOpens must be before coveringBegins")]
    VotingNotBeforeCovering,
    #[error("dates are in incorrect order: coveringBegins must be before coversDue")]
    CoveringNotBeforeDue,
    #[error("dates are in incorrect order: coversDue must not be after listeningParty")]
    DueAfterListeningParty,
}

impl MilestoneOrderError {
    /// Wire name of the later milestone in the offending pair.
    pub fn field(self) -> &'static str {
        match self {
            Self::SignupAfterVoting => "votingOpens",
            Self::VotingNotBeforeCovering => "coveringBegins",
            Self::CoveringNotBeforeDue => "coversDue",
            Self::DueAfterListeningParty => "listeningParty",
        }
    }
}

/// Where an instant falls relative to a round's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowPosition {
    /// Earlier than `signup_opens`.
    BeforeSignups,
    /// Within `[signup_opens, listening_party]`.
    Open,
    /// Later than `listening_party`.
    AfterListeningParty,
}

/// Five lifecycle dates of a round.
///
/// ## Invariants
/// `signup_opens <= voting_opens < covering_begins < covers_due <= listening_party`
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use eptss::domain::round::{MilestoneDates, RoundMilestones};
///
/// let at = |m, d| Utc.with_ymd_and_hms(2023, m, d, 0, 0, 0).unwrap();
/// let milestones = RoundMilestones::try_new(MilestoneDates {
///     signup_opens: at(1, 1),
///     voting_opens: at(1, 15),
///     covering_begins: at(1, 22),
///     covers_due: at(4, 14),
///     listening_party: at(4, 14),
/// });
/// assert!(milestones.is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "MilestoneDates")]
pub struct RoundMilestones(MilestoneDates);

impl RoundMilestones {
    /// Validate lifecycle ordering.
    pub fn try_new(dates: MilestoneDates) -> Result<Self, MilestoneOrderError> {
        let MilestoneDates {
            signup_opens,
            voting_opens,
            covering_begins,
            covers_due,
            listening_party,
        } = dates;
        if voting_opens >= covering_begins {
            return Err(MilestoneOrderError::VotingNotBeforeCovering);
        }
        if covering_begins >= covers_due {
            return Err(MilestoneOrderError::CoveringNotBeforeDue);
        }
        if signup_opens > voting_opens {
            return Err(MilestoneOrderError::SignupAfterVoting);
        }
        if covers_due > listening_party {
            return Err(MilestoneOrderError::DueAfterListeningParty);
        }
        Ok(Self(dates))
    }

    /// Apply a partial update and revalidate the result.
    pub fn patched(&self, patch: MilestonePatch) -> Result<Self, MilestoneOrderError> {
        let current = self.0;
        Self::try_new(MilestoneDates {
            signup_opens: patch.signup_opens.unwrap_or(current.signup_opens),
            voting_opens: patch.voting_opens.unwrap_or(current.voting_opens),
            covering_begins: patch.covering_begins.unwrap_or(current.covering_begins),
            covers_due: patch.covers_due.unwrap_or(current.covers_due),
            listening_party: patch.listening_party.unwrap_or(current.listening_party),
        })
    }

    pub fn dates(&self) -> MilestoneDates {
        self.0
    }

    pub fn signup_opens(&self) -> DateTime<Utc> {
        self.0.signup_opens
    }

    pub fn voting_opens(&self) -> DateTime<Utc> {
        self.0.voting_opens
    }

    pub fn covering_begins(&self) -> DateTime<Utc> {
        self.0.covering_begins
    }

    pub fn covers_due(&self) -> DateTime<Utc> {
        self.0.covers_due
    }

    pub fn listening_party(&self) -> DateTime<Utc> {
        self.0.listening_party
    }

    /// Locate `now` relative to the round's lifetime.
    pub fn window_position(&self, now: DateTime<Utc>) -> WindowPosition {
        if now < self.0.signup_opens {
            WindowPosition::BeforeSignups
        } else if now > self.0.listening_party {
            WindowPosition::AfterListeningParty
        } else {
            WindowPosition::Open
        }
    }
}

impl From<RoundMilestones> for MilestoneDates {
    fn from(value: RoundMilestones) -> Self {
        value.0
    }
}

impl TryFrom<MilestoneDates> for RoundMilestones {
    type Error = MilestoneOrderError;

    fn try_from(value: MilestoneDates) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}
