//! Response payloads shared by the round handlers.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::RoundOverview;
use crate::domain::round::{Round, RoundTimeline, Song};
use crate::domain::voting::{SongTally, StoredVote};
use crate::domain::{Signup, Submission};

/// A song suggested during signups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SongResponse {
    #[schema(example = 42)]
    pub id: i64,
    #[schema(example = "Harvest Moon")]
    pub title: String,
    #[schema(example = "Neil Young")]
    pub artist: String,
}

impl From<Song> for SongResponse {
    fn from(song: Song) -> Self {
        Self {
            id: song.id.0,
            title: song.title,
            artist: song.artist,
        }
    }
}

/// Aggregated votes for one song.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SongTallyResponse {
    pub song: SongResponse,
    /// Mean score rounded to two decimals.
    #[schema(example = 4.25)]
    pub average: f64,
    pub total: u32,
    pub votes_count: u32,
    pub one_star_count: u32,
}

impl From<SongTally> for SongTallyResponse {
    fn from(tally: SongTally) -> Self {
        let average = tally.average_rounded();
        Self {
            song: tally.song.into(),
            average,
            total: tally.total,
            votes_count: tally.votes_count,
            one_star_count: tally.one_star_count,
        }
    }
}

/// A round with its derived phase timeline.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundResponse {
    #[schema(example = "2024-01-01")]
    pub slug: String,
    pub playlist_url: Option<String>,
    /// Winning song once covering has begun.
    pub song: Option<SongResponse>,
    pub signup_count: usize,
    pub submission_count: usize,
    /// Phase, window position, milestones, date ranges and display labels.
    #[schema(value_type = Object)]
    pub timeline: RoundTimeline,
}

impl From<RoundOverview> for RoundResponse {
    fn from(overview: RoundOverview) -> Self {
        let RoundOverview {
            round,
            timeline,
            signup_count,
            submission_count,
        } = overview;
        Self {
            slug: round.slug.to_string(),
            playlist_url: round.playlist_url,
            song: round.song.map(SongResponse::from),
            signup_count,
            submission_count,
            timeline,
        }
    }
}

/// Admin view of a stored round.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredRoundResponse {
    pub id: i64,
    pub slug: String,
    pub playlist_url: Option<String>,
    pub song: Option<SongResponse>,
    #[schema(value_type = Object)]
    pub milestones: crate::domain::round::MilestoneDates,
}

impl From<Round> for StoredRoundResponse {
    fn from(round: Round) -> Self {
        Self {
            id: round.id.0,
            slug: round.slug.to_string(),
            playlist_url: round.playlist_url,
            song: round.song.map(SongResponse::from),
            milestones: round.milestones.dates(),
        }
    }
}

/// A member's signup.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: i64,
    pub user_id: String,
    pub song: SongResponse,
    pub youtube_link: String,
    pub additional_comments: Option<String>,
    pub created_at: String,
}

impl From<Signup> for SignupResponse {
    fn from(signup: Signup) -> Self {
        Self {
            id: signup.id,
            user_id: signup.user_id.to_string(),
            song: signup.song.into(),
            youtube_link: signup.youtube_link.as_ref().to_owned(),
            additional_comments: signup.additional_comments,
            created_at: signup.created_at.to_rfc3339(),
        }
    }
}

/// A cover submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: i64,
    pub user_id: String,
    pub soundcloud_url: String,
    pub additional_comments: Option<String>,
    pub created_at: String,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            user_id: submission.user_id.to_string(),
            soundcloud_url: submission.soundcloud_url.as_ref().to_owned(),
            additional_comments: submission.additional_comments,
            created_at: submission.created_at.to_rfc3339(),
        }
    }
}

/// One stored star rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub song: SongResponse,
    #[schema(minimum = 1, maximum = 5)]
    pub score: u8,
}

impl From<StoredVote> for VoteResponse {
    fn from(vote: StoredVote) -> Self {
        Self {
            song: vote.song.into(),
            score: vote.score.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{sample_overview, sample_song};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn tally_average_is_rounded() {
        let tally = SongTally {
            song: sample_song(1, "Jolene"),
            total: 10,
            votes_count: 3,
            one_star_count: 0,
        };
        let response = SongTallyResponse::from(tally);
        assert!((response.average - 3.33).abs() < f64::EPSILON);
        assert_eq!(response.song.id, 1);
    }

    #[rstest]
    fn round_response_nests_the_timeline() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).single().expect("date");
        let response = RoundResponse::from(sample_overview("2024-01-01", now));
        let json = serde_json::to_value(&response).expect("serialise");
        assert_eq!(json["slug"], "2024-01-01");
        assert_eq!(json["timeline"]["phase"], "signups");
        assert_eq!(json["signupCount"], Value::from(0));
        assert!(json["timeline"]["labels"]["signups"]["opens"].is_string());
    }
}
