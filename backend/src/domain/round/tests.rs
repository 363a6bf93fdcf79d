//! Phase calculator, date range and label coverage.

use super::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

fn worked_dates() -> MilestoneDates {
    MilestoneDates {
        signup_opens: at(2022, 11, 17),
        voting_opens: at(2022, 12, 6),
        covering_begins: at(2022, 12, 17),
        covers_due: at(2023, 1, 31),
        listening_party: at(2023, 2, 8),
    }
}

#[fixture]
fn milestones() -> RoundMilestones {
    RoundMilestones::try_new(worked_dates()).expect("worked example is ordered")
}

#[rstest]
#[case::during_signups(at(2022, 11, 18), Phase::Signups)]
#[case::voting_opens(at(2022, 12, 6), Phase::Voting)]
#[case::covering_begins(at(2022, 12, 17), Phase::Covering)]
#[case::covers_due(at(2023, 1, 31), Phase::Celebration)]
fn worked_example_phases(
    milestones: RoundMilestones,
    #[case] now: DateTime<Utc>,
    #[case] expected: Phase,
) {
    assert_eq!(compute_phase(now, &milestones), expected);
}

#[rstest]
fn boundaries_are_half_open(milestones: RoundMilestones) {
    let tick = Duration::milliseconds(1);
    let voting_opens = milestones.voting_opens();
    let covers_due = milestones.covers_due();
    assert_eq!(compute_phase(voting_opens - tick, &milestones), Phase::Signups);
    assert_eq!(compute_phase(voting_opens, &milestones), Phase::Voting);
    assert_eq!(compute_phase(covers_due - tick, &milestones), Phase::Covering);
    assert_eq!(compute_phase(covers_due, &milestones), Phase::Celebration);
}

#[rstest]
fn outside_the_window_phase_is_still_defined(milestones: RoundMilestones) {
    let before = at(2022, 1, 1);
    let after = at(2024, 1, 1);
    assert_eq!(compute_phase(before, &milestones), Phase::Signups);
    assert_eq!(milestones.window_position(before), WindowPosition::BeforeSignups);
    assert_eq!(compute_phase(after, &milestones), Phase::Celebration);
    assert_eq!(
        milestones.window_position(after),
        WindowPosition::AfterListeningParty
    );
}

#[rstest]
fn phase_never_moves_backwards_across_the_round(milestones: RoundMilestones) {
    let start = milestones.signup_opens() - Duration::days(3);
    let end = milestones.listening_party() + Duration::days(3);
    let mut now = start;
    let mut previous = compute_phase(now, &milestones);
    let mut seen = vec![previous];
    while now <= end {
        let phase = compute_phase(now, &milestones);
        assert!(phase >= previous, "phase regressed at {now}");
        if phase != previous {
            assert_eq!(previous.next(), Some(phase));
            seen.push(phase);
        }
        previous = phase;
        now += Duration::hours(7);
    }
    assert_eq!(seen, Phase::ALL.to_vec());
}

#[rstest]
fn window_position_includes_both_ends(milestones: RoundMilestones) {
    assert_eq!(
        milestones.window_position(milestones.signup_opens()),
        WindowPosition::Open
    );
    assert_eq!(
        milestones.window_position(milestones.listening_party()),
        WindowPosition::Open
    );
}

#[rstest]
#[case::covering_equals_voting(
    MilestoneDates { covering_begins: at(2022, 12, 6), ..worked_dates() },
    MilestoneOrderError::VotingNotBeforeCovering
)]
#[case::covering_before_voting(
    MilestoneDates { covering_begins: at(2022, 12, 1), ..worked_dates() },
    MilestoneOrderError::VotingNotBeforeCovering
)]
#[case::due_before_covering(
    MilestoneDates { covers_due: at(2022, 12, 10), ..worked_dates() },
    MilestoneOrderError::CoveringNotBeforeDue
)]
#[case::signup_after_voting(
    MilestoneDates { signup_opens: at(2022, 12, 7), ..worked_dates() },
    MilestoneOrderError::SignupAfterVoting
)]
#[case::party_before_due(
    MilestoneDates { listening_party: at(2023, 1, 30), ..worked_dates() },
    MilestoneOrderError::DueAfterListeningParty
)]
fn rejects_out_of_order_milestones(
    #[case] dates: MilestoneDates,
    #[case] expected: MilestoneOrderError,
) {
    let err = RoundMilestones::try_new(dates).expect_err("ordering violated");
    assert_eq!(err, expected);
    assert!(err.to_string().starts_with("dates are in incorrect order"));
}

#[rstest]
fn equal_outer_milestones_are_allowed() {
    let dates = MilestoneDates {
        signup_opens: at(2022, 12, 6),
        listening_party: at(2023, 1, 31),
        ..worked_dates()
    };
    assert!(RoundMilestones::try_new(dates).is_ok());
}

#[rstest]
fn patch_revalidates(milestones: RoundMilestones) {
    let moved = milestones
        .patched(MilestonePatch {
            listening_party: Some(at(2023, 2, 20)),
            ..MilestonePatch::default()
        })
        .expect("still ordered");
    assert_eq!(moved.listening_party(), at(2023, 2, 20));
    assert_eq!(moved.voting_opens(), milestones.voting_opens());

    let broken = milestones.patched(MilestonePatch {
        voting_opens: Some(at(2023, 1, 1)),
        ..MilestonePatch::default()
    });
    assert_eq!(broken, Err(MilestoneOrderError::VotingNotBeforeCovering));
}

#[rstest]
fn date_ranges_close_a_day_before_next_phase(milestones: RoundMilestones) {
    let ranges = compute_phase_date_ranges(&milestones);
    assert_eq!(
        ranges.signups,
        PhaseWindow {
            opens: at(2022, 11, 17),
            closes: at(2022, 12, 5)
        }
    );
    assert_eq!(
        ranges.voting,
        PhaseWindow {
            opens: at(2022, 12, 6),
            closes: at(2022, 12, 16)
        }
    );
    assert_eq!(
        ranges.covering,
        PhaseWindow {
            opens: at(2022, 12, 17),
            closes: at(2023, 1, 30)
        }
    );
    assert_eq!(
        ranges.celebration,
        PhaseWindow {
            opens: at(2023, 1, 31),
            closes: at(2023, 2, 8)
        }
    );
    assert_eq!(ranges.window(Phase::Voting), ranges.voting);
}

#[rstest]
#[case(1, "st")]
#[case(2, "nd")]
#[case(3, "rd")]
#[case(4, "th")]
#[case(11, "th")]
#[case(12, "th")]
#[case(13, "th")]
#[case(21, "st")]
#[case(22, "nd")]
#[case(23, "rd")]
#[case(31, "st")]
fn ordinal_suffixes(#[case] day: u32, #[case] expected: &str) {
    assert_eq!(ordinal_suffix(day), expected);
}

#[rstest]
#[case(at(2022, 12, 6), "Tuesday, Dec 6th")]
#[case(at(2023, 1, 31), "Tuesday, Jan 31st")]
#[case(at(2023, 2, 22), "Wednesday, Feb 22nd")]
#[case(at(2023, 3, 13), "Monday, Mar 13th")]
fn labels_use_weekday_month_and_ordinal(#[case] date: DateTime<Utc>, #[case] expected: &str) {
    assert_eq!(format_phase_label(date), expected);
}

#[rstest]
fn timeline_bundles_phase_ranges_and_labels(milestones: RoundMilestones) {
    let timeline = RoundTimeline::at(at(2022, 12, 10), &milestones);
    assert_eq!(timeline.phase, Phase::Voting);
    assert_eq!(timeline.window_position, WindowPosition::Open);
    assert_eq!(timeline.current_labels().opens, "Tuesday, Dec 6th");
    assert_eq!(timeline.current_labels().closes, "Friday, Dec 16th");
    assert_eq!(timeline.labels.celebration.closes, "Wednesday, Feb 8th");
}

#[rstest]
fn timeline_serialises_lowercase_phase(milestones: RoundMilestones) {
    let timeline = RoundTimeline::at(at(2022, 12, 20), &milestones);
    let value = serde_json::to_value(&timeline).expect("serialise");
    assert_eq!(value["phase"], "covering");
    assert_eq!(value["windowPosition"], "open");
    assert!(value["dateRanges"]["covering"]["opens"].is_string());
}

#[rstest]
#[case("2024-01-01", true)]
#[case("summer-special", true)]
#[case("", false)]
#[case("Round One", false)]
#[case("round_1", false)]
fn slug_validation(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(RoundSlug::new(raw).is_ok(), valid);
}

#[rstest]
fn song_details_trim_and_compare_case_insensitively() {
    let first = SongDetails::try_new("  Heroes ", "David Bowie").expect("valid");
    let second = SongDetails::try_new("heroes", "DAVID BOWIE").expect("valid");
    assert_eq!(first.title(), "Heroes");
    assert!(first.matches(&second));
}

#[rstest]
#[case("", "Artist", SongValidationError::EmptyTitle)]
#[case("Title", "  ", SongValidationError::EmptyArtist)]
fn song_details_reject_blank_fields(
    #[case] title: &str,
    #[case] artist: &str,
    #[case] expected: SongValidationError,
) {
    assert_eq!(SongDetails::try_new(title, artist), Err(expected));
}
