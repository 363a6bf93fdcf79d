//! PostgreSQL-backed `RoundRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{RoundRepository, RoundRepositoryError};
use crate::domain::round::{NewRound, Round, RoundId, RoundMilestones, RoundSlug, SongId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewRoundRow, RoundChangeset, RoundRow, SongRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::round_from_rows;
use super::schema::{round_metadata, songs};

#[derive(Clone)]
pub struct DieselRoundRepository {
    pool: DbPool,
}

impl DieselRoundRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> RoundRepositoryError {
    map_pool_error(error, RoundRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RoundRepositoryError {
    map_diesel_error(
        error,
        RoundRepositoryError::query,
        RoundRepositoryError::connection,
    )
}

type RoundWithSong = (RoundRow, Option<SongRow>);

fn to_round((row, song): RoundWithSong) -> Result<Round, RoundRepositoryError> {
    round_from_rows(row, song).map_err(RoundRepositoryError::invalid_row)
}

fn to_rounds(rows: Vec<RoundWithSong>) -> Result<Vec<Round>, RoundRepositoryError> {
    rows.into_iter().map(to_round).collect()
}

/// Rounds left-joined to their assigned song.
macro_rules! rounds_with_song {
    () => {
        round_metadata::table
            .left_join(songs::table)
            .select((RoundRow::as_select(), Option::<SongRow>::as_select()))
    };
}

async fn load_by_id(
    conn: &mut AsyncPgConnection,
    round_id: RoundId,
) -> Result<Round, RoundRepositoryError> {
    let row: Option<RoundWithSong> = rounds_with_song!()
        .filter(round_metadata::id.eq(round_id.0))
        .first(conn)
        .await
        .optional()
        .map_err(diesel_error)?;
    match row {
        Some(row) => to_round(row),
        None => Err(RoundRepositoryError::missing(round_id.0)),
    }
}

#[async_trait]
impl RoundRepository for DieselRoundRepository {
    async fn find_by_slug(&self, slug: &RoundSlug) -> Result<Option<Round>, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<RoundWithSong> = rounds_with_song!()
            .filter(round_metadata::slug.eq(slug.as_ref()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(to_round).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Round>, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<RoundWithSong> = rounds_with_song!()
            .order_by((round_metadata::signup_opens.desc(), round_metadata::id.desc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_rounds(rows)
    }

    async fn find_open_at(&self, now: DateTime<Utc>) -> Result<Option<Round>, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<RoundWithSong> = rounds_with_song!()
            .filter(round_metadata::signup_opens.le(now))
            .filter(round_metadata::listening_party.ge(now))
            .order_by((round_metadata::listening_party.asc(), round_metadata::id.asc()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(to_round).transpose()
    }

    async fn find_next_upcoming(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Round>, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<RoundWithSong> = rounds_with_song!()
            .filter(round_metadata::signup_opens.gt(now))
            .order_by((round_metadata::signup_opens.asc(), round_metadata::id.asc()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(to_round).transpose()
    }

    async fn list_voting_after(
        &self,
        voting_opens: DateTime<Utc>,
    ) -> Result<Vec<Round>, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<RoundWithSong> = rounds_with_song!()
            .filter(round_metadata::voting_opens.gt(voting_opens))
            .order_by(round_metadata::voting_opens.asc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        to_rounds(rows)
    }

    async fn insert(&self, round: &NewRound) -> Result<Round, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let dates = round.milestones.dates();
        let row = NewRoundRow {
            slug: round.slug.as_ref(),
            playlist_url: round.playlist_url.as_deref(),
            signup_opens: dates.signup_opens,
            voting_opens: dates.voting_opens,
            covering_begins: dates.covering_begins,
            covers_due: dates.covers_due,
            listening_party: dates.listening_party,
        };
        let inserted: RoundRow = diesel::insert_into(round_metadata::table)
            .values(&row)
            .returning(RoundRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(_) => RoundRepositoryError::duplicate_slug(round.slug.to_string()),
                None => diesel_error(err),
            })?;
        to_round((inserted, None))
    }

    async fn update(
        &self,
        round_id: RoundId,
        milestones: &RoundMilestones,
        playlist_url: Option<String>,
    ) -> Result<Round, RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let dates = milestones.dates();
        let changes = RoundChangeset {
            playlist_url: playlist_url.as_deref(),
            signup_opens: dates.signup_opens,
            voting_opens: dates.voting_opens,
            covering_begins: dates.covering_begins,
            covers_due: dates.covers_due,
            listening_party: dates.listening_party,
        };
        let updated = diesel::update(round_metadata::table.find(round_id.0))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(RoundRepositoryError::missing(round_id.0));
        }
        load_by_id(&mut conn, round_id).await
    }

    async fn set_song(&self, round_id: RoundId, song_id: SongId) -> Result<(), RoundRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(round_metadata::table.find(round_id.0))
            .set(round_metadata::song_id.eq(Some(song_id.0)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(RoundRepositoryError::missing(round_id.0));
        }
        Ok(())
    }
}
