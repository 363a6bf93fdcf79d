//! Diesel row structs. Internal to the persistence layer; repositories convert
//! them into domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    email_reminders_sent, login_tokens, round_metadata, sign_ups, song_selection_votes, songs,
    submissions, users,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub admin_level: i16,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub full_name: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = songs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SongRow {
    pub id: i64,
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = songs)]
pub(crate) struct NewSongRow<'a> {
    pub title: &'a str,
    pub artist: &'a str,
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = round_metadata)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoundRow {
    pub id: i64,
    pub slug: String,
    pub playlist_url: Option<String>,
    pub song_id: Option<i64>,
    pub signup_opens: DateTime<Utc>,
    pub voting_opens: DateTime<Utc>,
    pub covering_begins: DateTime<Utc>,
    pub covers_due: DateTime<Utc>,
    pub listening_party: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = round_metadata)]
pub(crate) struct NewRoundRow<'a> {
    pub slug: &'a str,
    pub playlist_url: Option<&'a str>,
    pub signup_opens: DateTime<Utc>,
    pub voting_opens: DateTime<Utc>,
    pub covering_begins: DateTime<Utc>,
    pub covers_due: DateTime<Utc>,
    pub listening_party: DateTime<Utc>,
}

/// Milestone and playlist changes; `None` clears the playlist.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = round_metadata)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RoundChangeset<'a> {
    pub playlist_url: Option<&'a str>,
    pub signup_opens: DateTime<Utc>,
    pub voting_opens: DateTime<Utc>,
    pub covering_begins: DateTime<Utc>,
    pub covers_due: DateTime<Utc>,
    pub listening_party: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Participation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sign_ups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SignupRow {
    pub id: i64,
    pub round_id: i64,
    pub user_id: Uuid,
    pub youtube_link: String,
    pub additional_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sign_ups)]
pub(crate) struct NewSignupRow<'a> {
    pub round_id: i64,
    pub user_id: Uuid,
    pub song_id: i64,
    pub youtube_link: &'a str,
    pub additional_comments: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = song_selection_votes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VoteRow {
    pub round_id: i64,
    pub user_id: Uuid,
    pub vote: i16,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = song_selection_votes)]
pub(crate) struct NewVoteRow {
    pub round_id: i64,
    pub user_id: Uuid,
    pub song_id: i64,
    pub vote: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubmissionRow {
    pub id: i64,
    pub round_id: i64,
    pub user_id: Uuid,
    pub soundcloud_url: String,
    pub additional_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = submissions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewSubmissionRow<'a> {
    pub round_id: i64,
    pub user_id: Uuid,
    pub soundcloud_url: &'a str,
    pub additional_comments: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Login tokens and reminders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = login_tokens)]
pub(crate) struct NewLoginTokenRow<'a> {
    pub token_hash: &'a str,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_reminders_sent)]
pub(crate) struct NewReminderRow<'a> {
    pub round_id: i64,
    pub user_id: Uuid,
    pub reminder_type: &'a str,
    pub success: bool,
    pub error_message: Option<&'a str>,
    pub sent_at: DateTime<Utc>,
}
