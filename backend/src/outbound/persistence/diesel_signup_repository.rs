//! PostgreSQL-backed `SignupRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{RoundParticipant, SignupRepository, SignupRepositoryError};
use crate::domain::round::{RoundId, Song};
use crate::domain::{Signup, SignupDraft, UserId, YoutubeLink};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_song_repository::find_or_create_song;
use super::models::{NewSignupRow, SignupRow, SongRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{song_from_row, user_from_row};
use super::schema::{sign_ups, songs, users};

#[derive(Clone)]
pub struct DieselSignupRepository {
    pool: DbPool,
}

impl DieselSignupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SignupRepositoryError {
    map_pool_error(error, SignupRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SignupRepositoryError {
    map_diesel_error(
        error,
        SignupRepositoryError::query,
        SignupRepositoryError::connection,
    )
}

fn to_signup(row: SignupRow, song: Song) -> Signup {
    Signup {
        id: row.id,
        round_id: RoundId(row.round_id),
        user_id: UserId::from_uuid(row.user_id),
        song,
        youtube_link: YoutubeLink::from_stored(row.youtube_link),
        additional_comments: row.additional_comments,
        created_at: row.created_at,
    }
}

#[async_trait]
impl SignupRepository for DieselSignupRepository {
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SignupDraft,
        now: DateTime<Utc>,
    ) -> Result<Signup, SignupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (row, song) = conn
            .transaction(|conn| {
                async move {
                    let song = find_or_create_song(conn, &draft.song).await?;
                    let new_row = NewSignupRow {
                        round_id: round_id.0,
                        user_id: *user_id.as_uuid(),
                        song_id: song.id,
                        youtube_link: draft.youtube_link.as_ref(),
                        additional_comments: draft.additional_comments.as_deref(),
                        created_at: now,
                    };
                    let row: SignupRow = diesel::insert_into(sign_ups::table)
                        .values(&new_row)
                        .on_conflict((sign_ups::round_id, sign_ups::user_id))
                        .do_update()
                        .set((
                            sign_ups::song_id.eq(new_row.song_id),
                            sign_ups::youtube_link.eq(new_row.youtube_link),
                            sign_ups::additional_comments.eq(new_row.additional_comments),
                            sign_ups::created_at.eq(now),
                        ))
                        .returning(SignupRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((row, song))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;
        Ok(to_signup(row, song_from_row(song)))
    }

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Signup>, SignupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(SignupRow, SongRow)> = sign_ups::table
            .inner_join(songs::table)
            .filter(sign_ups::round_id.eq(round_id.0))
            .filter(sign_ups::user_id.eq(user_id.as_uuid()))
            .select((SignupRow::as_select(), SongRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(|(row, song)| to_signup(row, song_from_row(song))))
    }

    async fn list_participants(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<RoundParticipant>, SignupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<(SignupRow, SongRow, UserRow)> = sign_ups::table
            .inner_join(songs::table)
            .inner_join(users::table)
            .filter(sign_ups::round_id.eq(round_id.0))
            .select((
                SignupRow::as_select(),
                SongRow::as_select(),
                UserRow::as_select(),
            ))
            .order_by((sign_ups::created_at.asc(), sign_ups::id.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|(signup, song, user)| {
                let user = user_from_row(user).map_err(SignupRepositoryError::query)?;
                Ok(RoundParticipant {
                    signup: to_signup(signup, song_from_row(song)),
                    user,
                })
            })
            .collect()
    }

    async fn count_for_round(&self, round_id: RoundId) -> Result<usize, SignupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let count: i64 = sign_ups::table
            .filter(sign_ups::round_id.eq(round_id.0))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        usize::try_from(count).map_err(|err| SignupRepositoryError::query(err.to_string()))
    }

    async fn voting_options(&self, round_id: RoundId) -> Result<Vec<Song>, SignupRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<SongRow> = songs::table
            .inner_join(sign_ups::table)
            .filter(sign_ups::round_id.eq(round_id.0))
            .select(SongRow::as_select())
            .distinct()
            .order_by((songs::title.asc(), songs::id.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(song_from_row).collect())
    }
}
