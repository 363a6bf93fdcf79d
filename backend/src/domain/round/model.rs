//! Round and song entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RoundMilestones;

/// Database identifier of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(pub i64);

/// Database identifier of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum slug length.
pub const ROUND_SLUG_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("slug must be 1 to {ROUND_SLUG_MAX} lowercase letters, digits or hyphens")]
pub struct RoundSlugError;

/// URL identifier of a round, e.g. `2024-04-01`.
///
/// Slugs are trimmed, non-empty, and composed of lowercase ASCII letters,
/// digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoundSlug(String);

impl RoundSlug {
    pub fn new(value: impl Into<String>) -> Result<Self, RoundSlugError> {
        let value = value.into();
        if is_valid_slug(&value) {
            Ok(Self(value))
        } else {
            Err(RoundSlugError)
        }
    }
}

fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= ROUND_SLUG_MAX
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

impl AsRef<str> for RoundSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoundSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RoundSlug> for String {
    fn from(value: RoundSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoundSlug {
    type Error = RoundSlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum title or artist length.
pub const SONG_FIELD_MAX: usize = 200;

/// Invalid song title or artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SongValidationError {
    #[error("song title must not be empty")]
    EmptyTitle,
    #[error("artist must not be empty")]
    EmptyArtist,
    #[error("song title must be at most {SONG_FIELD_MAX} characters")]
    TitleTooLong,
    #[error("artist must be at most {SONG_FIELD_MAX} characters")]
    ArtistTooLong,
}

impl SongValidationError {
    /// Wire name of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong => "title",
            Self::EmptyArtist | Self::ArtistTooLong => "artist",
        }
    }
}

/// Trimmed title and artist of a song.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    title: String,
    artist: String,
}

impl SongDetails {
    pub fn try_new(title: &str, artist: &str) -> Result<Self, SongValidationError> {
        let title = title.trim();
        let artist = artist.trim();
        if title.is_empty() {
            return Err(SongValidationError::EmptyTitle);
        }
        if artist.is_empty() {
            return Err(SongValidationError::EmptyArtist);
        }
        if title.chars().count() > SONG_FIELD_MAX {
            return Err(SongValidationError::TitleTooLong);
        }
        if artist.chars().count() > SONG_FIELD_MAX {
            return Err(SongValidationError::ArtistTooLong);
        }
        Ok(Self {
            title: title.to_owned(),
            artist: artist.to_owned(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Case-insensitive identity used to deduplicate songs.
    pub fn matches(&self, other: &SongDetails) -> bool {
        self.title.to_lowercase() == other.title.to_lowercase()
            && self.artist.to_lowercase() == other.artist.to_lowercase()
    }
}

/// Stored song.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub artist: String,
}

/// Stored round with its validated milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub id: RoundId,
    pub slug: RoundSlug,
    pub playlist_url: Option<String>,
    pub song: Option<Song>,
    pub milestones: RoundMilestones,
}

/// Round awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRound {
    pub slug: RoundSlug,
    pub playlist_url: Option<String>,
    pub milestones: RoundMilestones,
}
