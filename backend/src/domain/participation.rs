//! Signups and cover submissions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::domain::UserId;
use crate::domain::round::{
    Phase, RoundId, Song, SongDetails, SongValidationError, WindowPosition,
};

/// Maximum comment length.
pub const COMMENTS_MAX: usize = 1000;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

const SOUNDCLOUD_HOSTS: &[&str] = &[
    "soundcloud.com",
    "www.soundcloud.com",
    "m.soundcloud.com",
    "on.soundcloud.com",
];

/// Invalid participation form input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParticipationValidationError {
    #[error(transparent)]
    Song(#[from] SongValidationError),
    #[error("youtube link must be an http(s) YouTube URL")]
    InvalidYoutubeLink,
    #[error("soundcloud url must be an http(s) SoundCloud URL")]
    InvalidSoundcloudUrl,
    #[error("comments must be at most {COMMENTS_MAX} characters")]
    CommentsTooLong,
}

impl ParticipationValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Song(err) => err.field(),
            Self::InvalidYoutubeLink => "youtubeLink",
            Self::InvalidSoundcloudUrl => "soundcloudUrl",
            Self::CommentsTooLong => "additionalComments",
        }
    }
}

fn parse_hosted_url(raw: &str, hosts: &[&str]) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    hosts.contains(&host.as_str()).then_some(url)
}

/// Link to a YouTube performance of the suggested song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct YoutubeLink(String);

impl YoutubeLink {
    pub fn new(raw: &str) -> Result<Self, ParticipationValidationError> {
        parse_hosted_url(raw, YOUTUBE_HOSTS)
            .map(|url| Self(url.into()))
            .ok_or(ParticipationValidationError::InvalidYoutubeLink)
    }

    /// Wrap a stored link without revalidation.
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for YoutubeLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Link to a submitted cover on SoundCloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SoundcloudUrl(String);

impl SoundcloudUrl {
    pub fn new(raw: &str) -> Result<Self, ParticipationValidationError> {
        parse_hosted_url(raw, SOUNDCLOUD_HOSTS)
            .map(|url| Self(url.into()))
            .ok_or(ParticipationValidationError::InvalidSoundcloudUrl)
    }

    /// Wrap a stored URL without revalidation.
    pub fn from_stored(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for SoundcloudUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Optional free-text comment; blank input becomes `None`.
pub fn normalise_comments(
    raw: Option<&str>,
) -> Result<Option<String>, ParticipationValidationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > COMMENTS_MAX {
        return Err(ParticipationValidationError::CommentsTooLong);
    }
    Ok(Some(trimmed.to_owned()))
}

/// Validated signup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDraft {
    pub song: SongDetails,
    pub youtube_link: YoutubeLink,
    pub additional_comments: Option<String>,
}

impl SignupDraft {
    pub fn try_new(
        title: &str,
        artist: &str,
        youtube_link: &str,
        additional_comments: Option<&str>,
    ) -> Result<Self, ParticipationValidationError> {
        Ok(Self {
            song: SongDetails::try_new(title, artist)?,
            youtube_link: YoutubeLink::new(youtube_link)?,
            additional_comments: normalise_comments(additional_comments)?,
        })
    }
}

/// Stored signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub id: i64,
    pub round_id: RoundId,
    pub user_id: UserId,
    pub song: Song,
    pub youtube_link: YoutubeLink,
    pub additional_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub soundcloud_url: SoundcloudUrl,
    pub additional_comments: Option<String>,
}

impl SubmissionDraft {
    pub fn try_new(
        soundcloud_url: &str,
        additional_comments: Option<&str>,
    ) -> Result<Self, ParticipationValidationError> {
        Ok(Self {
            soundcloud_url: SoundcloudUrl::new(soundcloud_url)?,
            additional_comments: normalise_comments(additional_comments)?,
        })
    }
}

/// Stored cover submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub round_id: RoundId,
    pub user_id: UserId,
    pub soundcloud_url: SoundcloudUrl,
    pub additional_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Member action gated by round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationAction {
    SignUp,
    Vote,
    Submit,
}

impl ParticipationAction {
    /// Phase in which the action is accepted.
    pub fn required_phase(self) -> Phase {
        match self {
            Self::SignUp => Phase::Signups,
            Self::Vote => Phase::Voting,
            Self::Submit => Phase::Covering,
        }
    }

    /// Whether the action is open for a round in `phase` at `position`.
    pub fn is_open(self, phase: Phase, position: WindowPosition) -> bool {
        position == WindowPosition::Open && phase == self.required_phase()
    }

    /// Message returned when the action is attempted outside its phase.
    pub fn closed_message(self) -> &'static str {
        match self {
            Self::SignUp => "signups are closed for this round",
            Self::Vote => "voting is not open for this round",
            Self::Submit => "submissions are not open for this round",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=abc")]
    #[case("https://youtu.be/abc")]
    #[case("http://music.youtube.com/watch?v=abc")]
    #[case("https://M.YouTube.com/watch?v=abc")]
    fn accepts_youtube_hosts(#[case] raw: &str) {
        assert!(YoutubeLink::new(raw).is_ok());
    }

    #[rstest]
    #[case("ftp://youtube.com/watch")]
    #[case("https://youtube.com.evil.example/watch")]
    #[case("https://vimeo.com/123")]
    #[case("not a url")]
    fn rejects_other_video_links(#[case] raw: &str) {
        assert_eq!(
            YoutubeLink::new(raw),
            Err(ParticipationValidationError::InvalidYoutubeLink)
        );
    }

    #[rstest]
    #[case("https://soundcloud.com/user/cover", true)]
    #[case("https://on.soundcloud.com/xyz", true)]
    #[case("https://soundcloud.example.com/user", false)]
    fn soundcloud_hosts(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(SoundcloudUrl::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn blank_comments_become_none() {
        assert_eq!(normalise_comments(Some("   ")), Ok(None));
        assert_eq!(normalise_comments(None), Ok(None));
        assert_eq!(normalise_comments(Some(" hi ")), Ok(Some("hi".to_owned())));
    }

    #[rstest]
    fn long_comments_are_rejected() {
        let long = "x".repeat(COMMENTS_MAX + 1);
        let err = normalise_comments(Some(&long)).expect_err("too long");
        assert_eq!(err.field(), "additionalComments");
    }

    #[rstest]
    fn signup_draft_reports_song_field() {
        let err = SignupDraft::try_new(" ", "Bowie", "https://youtu.be/x", None)
            .expect_err("blank title");
        assert_eq!(err.field(), "title");
    }

    #[rstest]
    #[case(ParticipationAction::SignUp, Phase::Signups, WindowPosition::Open, true)]
    #[case(ParticipationAction::SignUp, Phase::Signups, WindowPosition::BeforeSignups, false)]
    #[case(ParticipationAction::SignUp, Phase::Voting, WindowPosition::Open, false)]
    #[case(ParticipationAction::Vote, Phase::Voting, WindowPosition::Open, true)]
    #[case(ParticipationAction::Submit, Phase::Covering, WindowPosition::Open, true)]
    #[case(ParticipationAction::Submit, Phase::Celebration, WindowPosition::Open, false)]
    fn action_gating(
        #[case] action: ParticipationAction,
        #[case] phase: Phase,
        #[case] position: WindowPosition,
        #[case] expected: bool,
    ) {
        assert_eq!(action.is_open(phase, position), expected);
    }
}
