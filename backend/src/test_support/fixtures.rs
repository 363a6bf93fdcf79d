//! Dates shared across tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::round::MilestoneDates;

/// Midnight UTC on the given day.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single() {
        Some(date) => date,
        None => panic!("invalid fixture date {year}-{month}-{day}"),
    }
}

/// Milestones of the winter 2022 round:
/// signups Nov 17, voting Dec 6, covering Dec 17, due Jan 31, party Feb 8.
pub fn winter_round_dates() -> MilestoneDates {
    MilestoneDates {
        signup_opens: utc(2022, 11, 17),
        voting_opens: utc(2022, 12, 6),
        covering_begins: utc(2022, 12, 17),
        covers_due: utc(2023, 1, 31),
        listening_party: utc(2023, 2, 8),
    }
}

/// Milestones of the following spring 2023 round.
pub fn spring_round_dates() -> MilestoneDates {
    MilestoneDates {
        signup_opens: utc(2023, 2, 9),
        voting_opens: utc(2023, 4, 15),
        covering_begins: utc(2023, 4, 22),
        covers_due: utc(2023, 7, 14),
        listening_party: utc(2023, 7, 14),
    }
}
