//! PostgreSQL-backed `VoteRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::UserId;
use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::round::RoundId;
use crate::domain::voting::{Ballot, StoredVote, VoteScore};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewVoteRow, SongRow, VoteRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::song_from_row;
use super::schema::{song_selection_votes, songs};

#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> VoteRepositoryError {
    map_pool_error(error, VoteRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> VoteRepositoryError {
    map_diesel_error(error, VoteRepositoryError::query, VoteRepositoryError::connection)
}

fn to_votes(rows: Vec<(VoteRow, SongRow)>) -> Result<Vec<StoredVote>, VoteRepositoryError> {
    rows.into_iter()
        .map(|(vote, song)| {
            let score = VoteScore::new(i64::from(vote.vote))
                .map_err(|err| VoteRepositoryError::query(format!("stored vote: {err}")))?;
            Ok(StoredVote {
                round_id: RoundId(vote.round_id),
                user_id: UserId::from_uuid(vote.user_id),
                song: song_from_row(song),
                score,
            })
        })
        .collect()
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn replace_ballot(
        &self,
        round_id: RoundId,
        user_id: UserId,
        ballot: &Ballot,
        now: DateTime<Utc>,
    ) -> Result<(), VoteRepositoryError> {
        let rows: Vec<NewVoteRow> = ballot
            .entries()
            .iter()
            .map(|(song_id, score)| NewVoteRow {
                round_id: round_id.0,
                user_id: *user_id.as_uuid(),
                song_id: song_id.0,
                vote: i16::from(score.value()),
                created_at: now,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    song_selection_votes::table
                        .filter(song_selection_votes::round_id.eq(round_id.0))
                        .filter(song_selection_votes::user_id.eq(user_id.as_uuid())),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(song_selection_votes::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(diesel_error)
    }

    async fn list_for_round(&self, round_id: RoundId) -> Result<Vec<StoredVote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<(VoteRow, SongRow)> = song_selection_votes::table
            .inner_join(songs::table)
            .filter(song_selection_votes::round_id.eq(round_id.0))
            .select((VoteRow::as_select(), SongRow::as_select()))
            .order_by(song_selection_votes::id.asc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_votes(rows)
    }

    async fn list_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Vec<StoredVote>, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<(VoteRow, SongRow)> = song_selection_votes::table
            .inner_join(songs::table)
            .filter(song_selection_votes::round_id.eq(round_id.0))
            .filter(song_selection_votes::user_id.eq(user_id.as_uuid()))
            .select((VoteRow::as_select(), SongRow::as_select()))
            .order_by((songs::title.asc(), songs::id.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_votes(rows)
    }
}
