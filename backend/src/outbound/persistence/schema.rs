//! Diesel table definitions.
//!
//! Keep in step with `migrations/`; `diesel print-schema` regenerates them
//! from a migrated database.

diesel::table! {
    /// Member accounts.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        full_name -> Nullable<Varchar>,
        /// `0` for members; `1` or more grants admin access.
        admin_level -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Songs suggested at signup or assigned to a round. Unique on
    /// case-folded title and artist.
    songs (id) {
        id -> Int8,
        title -> Varchar,
        artist -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rounds with their five milestone timestamps.
    round_metadata (id) {
        id -> Int8,
        slug -> Varchar,
        playlist_url -> Nullable<Text>,
        song_id -> Nullable<Int8>,
        signup_opens -> Timestamptz,
        voting_opens -> Timestamptz,
        covering_begins -> Timestamptz,
        covers_due -> Timestamptz,
        listening_party -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One signup per member and round.
    sign_ups (id) {
        id -> Int8,
        round_id -> Int8,
        user_id -> Uuid,
        song_id -> Int8,
        youtube_link -> Text,
        additional_comments -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    song_selection_votes (id) {
        id -> Int8,
        round_id -> Int8,
        user_id -> Uuid,
        song_id -> Int8,
        vote -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One cover per member and round.
    submissions (id) {
        id -> Int8,
        round_id -> Int8,
        user_id -> Uuid,
        soundcloud_url -> Text,
        additional_comments -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// SHA-256 digests of emailed login tokens.
    login_tokens (token_hash) {
        token_hash -> Varchar,
        user_id -> Uuid,
        expires_at -> Timestamptz,
        consumed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reminder send attempts, successful or not.
    email_reminders_sent (id) {
        id -> Int8,
        round_id -> Int8,
        user_id -> Uuid,
        reminder_type -> Varchar,
        success -> Bool,
        error_message -> Nullable<Text>,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(round_metadata -> songs (song_id));
diesel::joinable!(sign_ups -> round_metadata (round_id));
diesel::joinable!(sign_ups -> songs (song_id));
diesel::joinable!(sign_ups -> users (user_id));
diesel::joinable!(song_selection_votes -> round_metadata (round_id));
diesel::joinable!(song_selection_votes -> songs (song_id));
diesel::joinable!(song_selection_votes -> users (user_id));
diesel::joinable!(submissions -> round_metadata (round_id));
diesel::joinable!(submissions -> users (user_id));
diesel::joinable!(login_tokens -> users (user_id));
diesel::joinable!(email_reminders_sent -> round_metadata (round_id));
diesel::joinable!(email_reminders_sent -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    songs,
    round_metadata,
    sign_ups,
    song_selection_votes,
    submissions,
    login_tokens,
    email_reminders_sent,
);
