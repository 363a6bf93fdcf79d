//! In-memory implementation of every repository port.
//!
//! Behaviour mirrors the Diesel adapters closely enough for service and HTTP
//! tests: songs deduplicate case-insensitively, ballots replace earlier
//! votes, login tokens are single use and duplicate slugs are rejected.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    LoginTokenRepository, LoginTokenRepositoryError, ReminderLogRepository,
    ReminderLogRepositoryError, Repositories, RoundParticipant, RoundRepository,
    RoundRepositoryError, SignupRepository, SignupRepositoryError, SongRepository,
    SongRepositoryError, SubmissionRepository, SubmissionRepositoryError, UserPersistenceError,
    UserRepository, VoteRepository, VoteRepositoryError,
};
use crate::domain::reminders::{ReminderKind, ReminderLogEntry};
use crate::domain::round::{
    MilestoneDates, NewRound, Round, RoundId, RoundMilestones, RoundSlug, Song, SongDetails,
    SongId,
};
use crate::domain::voting::{Ballot, StoredVote, VoteScore};
use crate::domain::{
    EmailAddress, NewUser, Signup, SignupDraft, Submission, SubmissionDraft, User, UserId,
    Username, YoutubeLink,
};

const OFFLINE: &str = "in-memory store is offline";

#[derive(Debug, Clone)]
struct RoundRecord {
    id: RoundId,
    slug: RoundSlug,
    playlist_url: Option<String>,
    song_id: Option<SongId>,
    milestones: RoundMilestones,
}

#[derive(Debug, Clone)]
struct SignupRecord {
    id: i64,
    round_id: RoundId,
    user_id: UserId,
    song_id: SongId,
    youtube_link: YoutubeLink,
    additional_comments: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct VoteRecord {
    round_id: RoundId,
    user_id: UserId,
    song_id: SongId,
    score: VoteScore,
}

#[derive(Debug, Clone)]
struct TokenRecord {
    hash: String,
    user_id: UserId,
    expires_at: DateTime<Utc>,
    consumed: bool,
}

/// Reminder log row as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReminder {
    pub round_id: RoundId,
    pub user_id: UserId,
    pub kind: ReminderKind,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    offline: bool,
    users: Vec<User>,
    rounds: Vec<RoundRecord>,
    songs: Vec<Song>,
    signups: Vec<SignupRecord>,
    votes: Vec<VoteRecord>,
    submissions: Vec<Submission>,
    tokens: Vec<TokenRecord>,
    reminders: Vec<RecordedReminder>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn song(&self, id: SongId) -> Option<Song> {
        self.songs.iter().find(|song| song.id == id).cloned()
    }

    fn find_or_create_song(&mut self, details: &SongDetails) -> Song {
        let existing = self.songs.iter().find(|song| {
            song.title.to_lowercase() == details.title().to_lowercase()
                && song.artist.to_lowercase() == details.artist().to_lowercase()
        });
        if let Some(song) = existing {
            return song.clone();
        }
        let song = Song {
            id: SongId(self.next_id()),
            title: details.title().to_owned(),
            artist: details.artist().to_owned(),
        };
        self.songs.push(song.clone());
        song
    }

    fn round(&self, record: &RoundRecord) -> Round {
        Round {
            id: record.id,
            slug: record.slug.clone(),
            playlist_url: record.playlist_url.clone(),
            song: record.song_id.and_then(|id| self.song(id)),
            milestones: record.milestones,
        }
    }

    fn signup(&self, record: &SignupRecord) -> Option<Signup> {
        Some(Signup {
            id: record.id,
            round_id: record.round_id,
            user_id: record.user_id,
            song: self.song(record.song_id)?,
            youtube_link: record.youtube_link.clone(),
            additional_comments: record.additional_comments.clone(),
            created_at: record.created_at,
        })
    }

    fn vote(&self, record: &VoteRecord) -> Option<StoredVote> {
        Some(StoredVote {
            round_id: record.round_id,
            user_id: record.user_id,
            song: self.song(record.song_id)?,
            score: record.score,
        })
    }
}

/// Shared in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every repository port backed by this store.
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            rounds: self.clone(),
            songs: self.clone(),
            signups: self.clone(),
            votes: self.clone(),
            submissions: self.clone(),
            users: self.clone(),
            login_tokens: self.clone(),
            reminder_log: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("in-memory store mutex"),
        }
    }

    fn online<E>(&self, offline: impl FnOnce(String) -> E) -> Result<MutexGuard<'_, State>, E> {
        let state = self.lock();
        if state.offline {
            return Err(offline(OFFLINE.to_owned()));
        }
        Ok(state)
    }

    /// Make every repository call fail with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Insert a user directly.
    pub fn seed_user(&self, email: &str, username: &str, admin_level: i16) -> User {
        let user = User {
            id: UserId::random(),
            email: EmailAddress::new(email)
                .unwrap_or_else(|err| panic!("seed email {email} invalid: {err}")),
            username: Username::new(username)
                .unwrap_or_else(|err| panic!("seed username {username} invalid: {err}")),
            full_name: None,
            admin_level,
        };
        self.lock().users.push(user.clone());
        user
    }

    /// Insert a round directly.
    pub fn seed_round(&self, slug: &str, dates: MilestoneDates) -> Round {
        let milestones = RoundMilestones::try_new(dates)
            .unwrap_or_else(|err| panic!("seed milestones invalid: {err}"));
        let slug =
            RoundSlug::new(slug).unwrap_or_else(|err| panic!("seed slug {slug} invalid: {err}"));
        let mut state = self.lock();
        let record = RoundRecord {
            id: RoundId(state.next_id()),
            slug,
            playlist_url: None,
            song_id: None,
            milestones,
        };
        state.rounds.push(record.clone());
        state.round(&record)
    }

    /// Reminder log rows in insertion order.
    pub fn reminder_log(&self) -> Vec<RecordedReminder> {
        self.lock().reminders.clone()
    }

    /// Slugs of every stored round, in insertion order.
    pub fn round_slugs(&self) -> Vec<String> {
        self.lock()
            .rounds
            .iter()
            .map(|record| record.slug.to_string())
            .collect()
    }

    /// Number of login tokens issued and not yet consumed.
    pub fn live_token_count(&self) -> usize {
        self.lock().tokens.iter().filter(|token| !token.consumed).count()
    }

    /// Token rows still stored, spent or not.
    pub fn stored_token_count(&self) -> usize {
        self.lock().tokens.len()
    }
}

#[async_trait]
impl RoundRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &RoundSlug) -> Result<Option<Round>, RoundRepositoryError> {
        let state = self.online(RoundRepositoryError::connection)?;
        Ok(state
            .rounds
            .iter()
            .find(|record| &record.slug == slug)
            .map(|record| state.round(record)))
    }

    async fn list_all(&self) -> Result<Vec<Round>, RoundRepositoryError> {
        let state = self.online(RoundRepositoryError::connection)?;
        let mut records = state.rounds.clone();
        records.sort_by(|a, b| b.milestones.signup_opens().cmp(&a.milestones.signup_opens()));
        Ok(records.iter().map(|record| state.round(record)).collect())
    }

    async fn find_open_at(&self, now: DateTime<Utc>) -> Result<Option<Round>, RoundRepositoryError> {
        let state = self.online(RoundRepositoryError::connection)?;
        Ok(state
            .rounds
            .iter()
            .filter(|record| {
                record.milestones.signup_opens() <= now && now <= record.milestones.listening_party()
            })
            .min_by_key(|record| record.milestones.listening_party())
            .map(|record| state.round(record)))
    }

    async fn find_next_upcoming(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Round>, RoundRepositoryError> {
        let state = self.online(RoundRepositoryError::connection)?;
        Ok(state
            .rounds
            .iter()
            .filter(|record| record.milestones.signup_opens() > now)
            .min_by_key(|record| record.milestones.signup_opens())
            .map(|record| state.round(record)))
    }

    async fn list_voting_after(
        &self,
        voting_opens: DateTime<Utc>,
    ) -> Result<Vec<Round>, RoundRepositoryError> {
        let state = self.online(RoundRepositoryError::connection)?;
        let mut records: Vec<&RoundRecord> = state
            .rounds
            .iter()
            .filter(|record| record.milestones.voting_opens() > voting_opens)
            .collect();
        records.sort_by_key(|record| record.milestones.voting_opens());
        Ok(records.into_iter().map(|record| state.round(record)).collect())
    }

    async fn insert(&self, round: &NewRound) -> Result<Round, RoundRepositoryError> {
        let mut state = self.online(RoundRepositoryError::connection)?;
        if state.rounds.iter().any(|record| record.slug == round.slug) {
            return Err(RoundRepositoryError::duplicate_slug(round.slug.to_string()));
        }
        let record = RoundRecord {
            id: RoundId(state.next_id()),
            slug: round.slug.clone(),
            playlist_url: round.playlist_url.clone(),
            song_id: None,
            milestones: round.milestones,
        };
        state.rounds.push(record.clone());
        Ok(state.round(&record))
    }

    async fn update(
        &self,
        round_id: RoundId,
        milestones: &RoundMilestones,
        playlist_url: Option<String>,
    ) -> Result<Round, RoundRepositoryError> {
        let mut state = self.online(RoundRepositoryError::connection)?;
        let record = state
            .rounds
            .iter_mut()
            .find(|record| record.id == round_id)
            .ok_or(RoundRepositoryError::Missing { round_id: round_id.0 })?;
        record.milestones = *milestones;
        record.playlist_url = playlist_url;
        let record = record.clone();
        Ok(state.round(&record))
    }

    async fn set_song(&self, round_id: RoundId, song_id: SongId) -> Result<(), RoundRepositoryError> {
        let mut state = self.online(RoundRepositoryError::connection)?;
        let record = state
            .rounds
            .iter_mut()
            .find(|record| record.id == round_id)
            .ok_or(RoundRepositoryError::Missing { round_id: round_id.0 })?;
        record.song_id = Some(song_id);
        Ok(())
    }
}

#[async_trait]
impl SongRepository for InMemoryStore {
    async fn find_or_create(&self, details: &SongDetails) -> Result<Song, SongRepositoryError> {
        let mut state = self.online(SongRepositoryError::connection)?;
        Ok(state.find_or_create_song(details))
    }
}

#[async_trait]
impl SignupRepository for InMemoryStore {
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SignupDraft,
        now: DateTime<Utc>,
    ) -> Result<Signup, SignupRepositoryError> {
        let mut state = self.online(SignupRepositoryError::connection)?;
        let song = state.find_or_create_song(&draft.song);
        let existing = state
            .signups
            .iter()
            .position(|record| record.round_id == round_id && record.user_id == user_id);
        let id = match existing {
            Some(index) => state.signups.remove(index).id,
            None => state.next_id(),
        };
        let record = SignupRecord {
            id,
            round_id,
            user_id,
            song_id: song.id,
            youtube_link: draft.youtube_link.clone(),
            additional_comments: draft.additional_comments.clone(),
            created_at: now,
        };
        state.signups.push(record.clone());
        state
            .signup(&record)
            .ok_or_else(|| SignupRepositoryError::query("signup song vanished"))
    }

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Signup>, SignupRepositoryError> {
        let state = self.online(SignupRepositoryError::connection)?;
        Ok(state
            .signups
            .iter()
            .find(|record| record.round_id == round_id && record.user_id == user_id)
            .and_then(|record| state.signup(record)))
    }

    async fn list_participants(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<RoundParticipant>, SignupRepositoryError> {
        let state = self.online(SignupRepositoryError::connection)?;
        let mut records: Vec<&SignupRecord> = state
            .signups
            .iter()
            .filter(|record| record.round_id == round_id)
            .collect();
        records.sort_by_key(|record| (record.created_at, record.id));
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let user = state.users.iter().find(|user| user.id == record.user_id)?;
                Some(RoundParticipant {
                    signup: state.signup(record)?,
                    user: user.clone(),
                })
            })
            .collect())
    }

    async fn count_for_round(&self, round_id: RoundId) -> Result<usize, SignupRepositoryError> {
        let state = self.online(SignupRepositoryError::connection)?;
        Ok(state
            .signups
            .iter()
            .filter(|record| record.round_id == round_id)
            .count())
    }

    async fn voting_options(&self, round_id: RoundId) -> Result<Vec<Song>, SignupRepositoryError> {
        let state = self.online(SignupRepositoryError::connection)?;
        let mut songs: Vec<Song> = Vec::new();
        for record in state.signups.iter().filter(|record| record.round_id == round_id) {
            if songs.iter().any(|song| song.id == record.song_id) {
                continue;
            }
            if let Some(song) = state.song(record.song_id) {
                songs.push(song);
            }
        }
        songs.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(songs)
    }
}

#[async_trait]
impl VoteRepository for InMemoryStore {
    async fn replace_ballot(
        &self,
        round_id: RoundId,
        user_id: UserId,
        ballot: &Ballot,
        _now: DateTime<Utc>,
    ) -> Result<(), VoteRepositoryError> {
        let mut state = self.online(VoteRepositoryError::connection)?;
        state
            .votes
            .retain(|record| !(record.round_id == round_id && record.user_id == user_id));
        state
            .votes
            .extend(ballot.entries().iter().map(|(song_id, score)| VoteRecord {
                round_id,
                user_id,
                song_id: *song_id,
                score: *score,
            }));
        Ok(())
    }

    async fn list_for_round(&self, round_id: RoundId) -> Result<Vec<StoredVote>, VoteRepositoryError> {
        let state = self.online(VoteRepositoryError::connection)?;
        Ok(state
            .votes
            .iter()
            .filter(|record| record.round_id == round_id)
            .filter_map(|record| state.vote(record))
            .collect())
    }

    async fn list_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Vec<StoredVote>, VoteRepositoryError> {
        let state = self.online(VoteRepositoryError::connection)?;
        Ok(state
            .votes
            .iter()
            .filter(|record| record.round_id == round_id && record.user_id == user_id)
            .filter_map(|record| state.vote(record))
            .collect())
    }
}

fn build_submission(
    id: i64,
    round_id: RoundId,
    user_id: UserId,
    draft: &SubmissionDraft,
    now: DateTime<Utc>,
) -> Submission {
    Submission {
        id,
        round_id,
        user_id,
        soundcloud_url: draft.soundcloud_url.clone(),
        additional_comments: draft.additional_comments.clone(),
        created_at: now,
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryStore {
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut state = self.online(SubmissionRepositoryError::connection)?;
        let existing = state
            .submissions
            .iter()
            .position(|row| row.round_id == round_id && row.user_id == user_id);
        let id = match existing {
            Some(index) => state.submissions.remove(index).id,
            None => state.next_id(),
        };
        let submission = build_submission(id, round_id, user_id, draft, now);
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn insert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut state = self.online(SubmissionRepositoryError::connection)?;
        if state
            .submissions
            .iter()
            .any(|row| row.round_id == round_id && row.user_id == user_id)
        {
            return Err(SubmissionRepositoryError::duplicate(round_id.0));
        }
        let id = state.next_id();
        let submission = build_submission(id, round_id, user_id, draft, now);
        state.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let state = self.online(SubmissionRepositoryError::connection)?;
        Ok(state
            .submissions
            .iter()
            .find(|row| row.round_id == round_id && row.user_id == user_id)
            .cloned())
    }

    async fn list_for_round(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let state = self.online(SubmissionRepositoryError::connection)?;
        Ok(state
            .submissions
            .iter()
            .filter(|row| row.round_id == round_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.online(UserPersistenceError::connection)?;
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        if state
            .users
            .iter()
            .any(|existing| existing.username == user.username)
        {
            return Err(UserPersistenceError::DuplicateUsername);
        }
        let created = User {
            id: UserId::random(),
            email: user.email.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            admin_level: 0,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.online(UserPersistenceError::connection)?;
        Ok(state.users.iter().find(|user| &user.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.online(UserPersistenceError::connection)?;
        Ok(state.users.iter().find(|user| &user.email == email).cloned())
    }
}

#[async_trait]
impl LoginTokenRepository for InMemoryStore {
    async fn store(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LoginTokenRepositoryError> {
        let mut state = self.online(LoginTokenRepositoryError::connection)?;
        state.tokens.push(TokenRecord {
            hash: token_hash.to_owned(),
            user_id,
            expires_at,
            consumed: false,
        });
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, LoginTokenRepositoryError> {
        let mut state = self.online(LoginTokenRepositoryError::connection)?;
        let token = state
            .tokens
            .iter_mut()
            .find(|token| token.hash == token_hash && !token.consumed && token.expires_at > now);
        Ok(token.map(|token| {
            token.consumed = true;
            token.user_id
        }))
    }

    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, LoginTokenRepositoryError> {
        let mut state = self.online(LoginTokenRepositoryError::connection)?;
        let before = state.tokens.len();
        state
            .tokens
            .retain(|token| !token.consumed && token.expires_at > now);
        Ok(before - state.tokens.len())
    }
}

#[async_trait]
impl ReminderLogRepository for InMemoryStore {
    async fn has_successful(
        &self,
        round_id: RoundId,
        user_id: UserId,
        kind: ReminderKind,
    ) -> Result<bool, ReminderLogRepositoryError> {
        let state = self.online(ReminderLogRepositoryError::connection)?;
        Ok(state.reminders.iter().any(|row| {
            row.round_id == round_id && row.user_id == user_id && row.kind == kind && row.success
        }))
    }

    async fn record(
        &self,
        round_id: RoundId,
        user_id: UserId,
        entry: &ReminderLogEntry,
        _now: DateTime<Utc>,
    ) -> Result<(), ReminderLogRepositoryError> {
        let mut state = self.online(ReminderLogRepositoryError::connection)?;
        let already_sent = entry.success
            && state.reminders.iter().any(|row| {
                row.round_id == round_id
                    && row.user_id == user_id
                    && row.kind == entry.kind
                    && row.success
            });
        if already_sent {
            return Ok(());
        }
        state.reminders.push(RecordedReminder {
            round_id,
            user_id,
            kind: entry.kind,
            success: entry.success,
            error_message: entry.error_message.clone(),
        });
        Ok(())
    }
}
