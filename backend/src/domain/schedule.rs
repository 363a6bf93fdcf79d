//! Quarterly round calendar.
//!
//! Rounds start on the first day of each calendar quarter. Voting opens two
//! weeks in, covering a week after that, and covers are due two weeks after
//! the quarter ends. The listening party is held on the due date.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::domain::round::{MilestoneDates, MilestoneOrderError, RoundMilestones, RoundSlug};

/// Days from quarter start until voting opens.
pub const VOTING_OFFSET_DAYS: i64 = 14;
/// Days from voting opening until covering begins.
pub const COVERING_OFFSET_DAYS: i64 = 7;
/// Days after quarter end until covers are due.
pub const COVERS_DUE_OFFSET_DAYS: i64 = 14;

/// A calendar quarter, `index` in `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quarter {
    year: i32,
    index: u32,
}

impl Quarter {
    pub fn new(year: i32, index: u32) -> Option<Self> {
        (1..=4).contains(&index).then_some(Self { year, index })
    }

    /// Quarter containing `date`.
    pub fn containing(date: DateTime<Utc>) -> Self {
        Self {
            year: date.year(),
            index: (date.month() - 1) / 3 + 1,
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn next(self) -> Self {
        if self.index == 4 {
            Self {
                year: self.year + 1,
                index: 1,
            }
        } else {
            Self {
                year: self.year,
                index: self.index + 1,
            }
        }
    }

    fn first_month(self) -> u32 {
        (self.index - 1) * 3 + 1
    }

    /// Midnight UTC on the first day of the quarter.
    pub fn start(self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(self.year, self.first_month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Last millisecond of the quarter.
    pub fn end(self) -> DateTime<Utc> {
        self.next().start() - Duration::milliseconds(1)
    }

    /// Slug of the round that starts this quarter, `YYYY-MM-DD`.
    pub fn slug(self) -> String {
        format!("{:04}-{:02}-01", self.year, self.first_month())
    }
}

/// Planned round for one quarter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    pub quarter: Quarter,
    pub slug: RoundSlug,
    pub milestones: RoundMilestones,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulePlanError {
    #[error("planned milestones are invalid: {0}")]
    Milestones(#[from] MilestoneOrderError),
    #[error("planned slug {0} is invalid")]
    Slug(String),
}

/// Plan the round for `quarter` with signups opening at `signup_opens`.
///
/// A `signup_opens` later than voting is clamped to the voting date.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use eptss::domain::schedule::{plan_quarterly_round, Quarter};
///
/// let quarter = Quarter::new(2024, 2).unwrap();
/// let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
/// let plan = plan_quarterly_round(quarter, now).unwrap();
/// assert_eq!(plan.slug.as_ref(), "2024-04-01");
/// ```
pub fn plan_quarterly_round(
    quarter: Quarter,
    signup_opens: DateTime<Utc>,
) -> Result<RoundPlan, SchedulePlanError> {
    let voting_opens = quarter.start() + Duration::days(VOTING_OFFSET_DAYS);
    let covering_begins = voting_opens + Duration::days(COVERING_OFFSET_DAYS);
    let covers_due = quarter.end() + Duration::days(COVERS_DUE_OFFSET_DAYS);
    let milestones = RoundMilestones::try_new(MilestoneDates {
        signup_opens: signup_opens.min(voting_opens),
        voting_opens,
        covering_begins,
        covers_due,
        listening_party: covers_due,
    })?;
    let slug = quarter.slug();
    let slug = RoundSlug::new(slug.clone()).map_err(|_| SchedulePlanError::Slug(slug))?;
    Ok(RoundPlan {
        quarter,
        slug,
        milestones,
    })
}

/// Plan `count` rounds for the quarters strictly after the one containing
/// `from`.
pub fn next_quarterly_rounds(
    from: DateTime<Utc>,
    count: usize,
    signup_opens: DateTime<Utc>,
) -> Result<Vec<RoundPlan>, SchedulePlanError> {
    let mut quarter = Quarter::containing(from);
    let mut plans = Vec::with_capacity(count);
    for _ in 0..count {
        quarter = quarter.next();
        plans.push(plan_quarterly_round(quarter, signup_opens)?);
    }
    Ok(plans)
}

/// Parse a quarterly slug such as `2024-07-01` into its quarter.
///
/// Only the year and month matter: any two-digit day in January, April, July
/// or October names that quarter's round. Returns `None` for other months or
/// formats.
pub fn parse_round_slug(slug: &str) -> Option<Quarter> {
    let mut parts = slug.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let all_digits = |part: &str, len: usize| {
        part.len() == len && part.bytes().all(|byte| byte.is_ascii_digit())
    };
    if !(all_digits(year, 4) && all_digits(month, 2) && all_digits(day, 2)) {
        return None;
    }
    let index = match month {
        "01" => 1,
        "04" => 2,
        "07" => 3,
        "10" => 4,
        _ => return None,
    };
    Quarter::new(year.parse().ok()?, index)
}
