//! Ballots, tallies and winner selection.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::round::{RoundId, Song, SongId};

/// Lowest allowed score.
pub const MIN_SCORE: u8 = 1;
/// Highest allowed score.
pub const MAX_SCORE: u8 = 5;

/// Score from one to five stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VoteScore(u8);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BallotError {
    #[error("No votes submitted")]
    Empty,
    #[error("score must be between {MIN_SCORE} and {MAX_SCORE}, got {score}")]
    ScoreOutOfRange { score: i64 },
    #[error("song {song_id} appears more than once")]
    DuplicateSong { song_id: SongId },
}

impl VoteScore {
    pub fn new(score: i64) -> Result<Self, BallotError> {
        u8::try_from(score)
            .ok()
            .filter(|value| (MIN_SCORE..=MAX_SCORE).contains(value))
            .map(Self)
            .ok_or(BallotError::ScoreOutOfRange { score })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for VoteScore {
    type Error = BallotError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<VoteScore> for u8 {
    fn from(value: VoteScore) -> Self {
        value.0
    }
}

/// Validated set of scores from one member for one round.
///
/// ## Invariants
/// - At least one entry.
/// - Each song appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot(Vec<(SongId, VoteScore)>);

impl Ballot {
    /// Validate raw `(song, score)` pairs.
    ///
    /// # Examples
    /// ```
    /// use eptss::domain::round::SongId;
    /// use eptss::domain::voting::{Ballot, BallotError};
    ///
    /// assert_eq!(Ballot::try_new(Vec::new()), Err(BallotError::Empty));
    /// let ballot = Ballot::try_new(vec![(SongId(1), 5), (SongId(2), 3)]).unwrap();
    /// assert_eq!(ballot.entries().len(), 2);
    /// ```
    pub fn try_new(entries: Vec<(SongId, i64)>) -> Result<Self, BallotError> {
        if entries.is_empty() {
            return Err(BallotError::Empty);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        let mut validated = Vec::with_capacity(entries.len());
        for (song_id, score) in entries {
            if !seen.insert(song_id) {
                return Err(BallotError::DuplicateSong { song_id });
            }
            validated.push((song_id, VoteScore::new(score)?));
        }
        Ok(Self(validated))
    }

    pub fn entries(&self) -> &[(SongId, VoteScore)] {
        &self.0
    }

    pub fn song_ids(&self) -> impl Iterator<Item = SongId> + '_ {
        self.0.iter().map(|(song_id, _)| *song_id)
    }
}

/// Persisted vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVote {
    pub round_id: RoundId,
    pub user_id: UserId,
    pub song: Song,
    pub score: VoteScore,
}

/// Aggregated scores for one song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongTally {
    pub song: Song,
    pub total: u32,
    pub votes_count: u32,
    pub one_star_count: u32,
}

impl SongTally {
    /// Mean score, zero when there are no votes.
    pub fn average(&self) -> f64 {
        if self.votes_count == 0 {
            return 0.0;
        }
        f64::from(self.total) / f64::from(self.votes_count)
    }

    /// Mean score rounded to two decimals for display.
    pub fn average_rounded(&self) -> f64 {
        (self.average() * 100.0).round() / 100.0
    }

    /// Exact comparison of averages by cross-multiplication.
    fn cmp_average(&self, other: &Self) -> Ordering {
        let left = u64::from(self.total) * u64::from(other.votes_count);
        let right = u64::from(other.total) * u64::from(self.votes_count);
        left.cmp(&right)
    }
}

/// Aggregate votes per song.
///
/// Ordered by average descending, then fewer one-star votes, then title.
pub fn tally_votes(votes: &[StoredVote]) -> Vec<SongTally> {
    let mut by_song: BTreeMap<SongId, SongTally> = BTreeMap::new();
    for vote in votes {
        let entry = by_song.entry(vote.song.id).or_insert_with(|| SongTally {
            song: vote.song.clone(),
            total: 0,
            votes_count: 0,
            one_star_count: 0,
        });
        entry.total += u32::from(vote.score.value());
        entry.votes_count += 1;
        if vote.score.value() == MIN_SCORE {
            entry.one_star_count += 1;
        }
    }
    let mut tallies: Vec<SongTally> = by_song.into_values().collect();
    tallies.sort_by(|a, b| {
        b.cmp_average(a)
            .then_with(|| a.one_star_count.cmp(&b.one_star_count))
            .then_with(|| a.song.title.cmp(&b.song.title))
            .then_with(|| a.song.id.cmp(&b.song.id))
    });
    tallies
}

/// Pick the winning song.
///
/// Highest average wins; ties go to fewer one-star votes, then the lowest
/// song id.
pub fn select_winner(tallies: &[SongTally]) -> Option<SongTally> {
    tallies
        .iter()
        .filter(|tally| tally.votes_count > 0)
        .max_by(|a, b| {
            a.cmp_average(b)
                .then_with(|| b.one_star_count.cmp(&a.one_star_count))
                .then_with(|| b.song.id.cmp(&a.song.id))
        })
        .cloned()
}
