//! Row to domain conversions shared by repositories that join across tables.
//!
//! Stored values are revalidated; a failure yields a message the caller wraps
//! in its own invalid-row error.

use crate::domain::round::{MilestoneDates, Round, RoundId, RoundMilestones, RoundSlug, Song, SongId};
use crate::domain::{EmailAddress, User, UserId, Username};

use super::models::{RoundRow, SongRow, UserRow};

pub(crate) fn song_from_row(row: SongRow) -> Song {
    Song {
        id: SongId(row.id),
        title: row.title,
        artist: row.artist,
    }
}

pub(crate) fn round_from_rows(row: RoundRow, song: Option<SongRow>) -> Result<Round, String> {
    let slug = RoundSlug::new(row.slug.clone())
        .map_err(|err| format!("round {} has invalid slug {:?}: {err}", row.id, row.slug))?;
    let milestones = RoundMilestones::try_new(MilestoneDates {
        signup_opens: row.signup_opens,
        voting_opens: row.voting_opens,
        covering_begins: row.covering_begins,
        covers_due: row.covers_due,
        listening_party: row.listening_party,
    })
    .map_err(|err| format!("round {slug}: {err}"))?;
    Ok(Round {
        id: RoundId(row.id),
        slug,
        playlist_url: row.playlist_url,
        song: song.map(song_from_row),
        milestones,
    })
}

pub(crate) fn user_from_row(row: UserRow) -> Result<User, String> {
    let email = EmailAddress::new(&row.email)
        .map_err(|err| format!("user {} has invalid email: {err}", row.id))?;
    let username = Username::new(row.username)
        .map_err(|err| format!("user {} has invalid username: {err}", row.id))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        email,
        username,
        full_name: row.full_name,
        admin_level: row.admin_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn round_row(slug: &str, voting_day: u32) -> RoundRow {
        let at = |day| Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single().expect("date");
        RoundRow {
            id: 7,
            slug: slug.to_owned(),
            playlist_url: None,
            song_id: Some(3),
            signup_opens: at(1),
            voting_opens: at(voting_day),
            covering_begins: at(15),
            covers_due: at(25),
            listening_party: at(28),
        }
    }

    #[rstest]
    fn converts_round_with_song() {
        let song = SongRow {
            id: 3,
            title: "Heroes".to_owned(),
            artist: "David Bowie".to_owned(),
        };
        let round = round_from_rows(round_row("2024-01-01", 10), Some(song)).expect("valid row");
        assert_eq!(round.slug.as_ref(), "2024-01-01");
        assert_eq!(round.song.map(|song| song.id), Some(SongId(3)));
    }

    #[rstest]
    #[case::bad_slug("Not A Slug", 10)]
    #[case::misordered("2024-01-01", 20)]
    fn rejects_invalid_rounds(#[case] slug: &str, #[case] voting_day: u32) {
        assert!(round_from_rows(round_row(slug, voting_day), None).is_err());
    }

    #[rstest]
    fn rejects_invalid_user_rows() {
        let row = UserRow {
            id: Uuid::nil(),
            email: "not-an-email".to_owned(),
            username: "ada".to_owned(),
            full_name: None,
            admin_level: 0,
        };
        let message = user_from_row(row).expect_err("invalid email");
        assert!(message.contains("invalid email"));
    }
}
