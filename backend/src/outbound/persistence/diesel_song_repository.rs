//! PostgreSQL-backed `SongRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{SongRepository, SongRepositoryError};
use crate::domain::round::{Song, SongDetails};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSongRow, SongRow};
use super::pool::DbPool;
use super::row_conversions::song_from_row;
use super::schema::songs;

diesel::define_sql_function! {
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Find a song by case-insensitive title and artist, inserting it if absent.
///
/// A concurrent insert of the same song loses the unique index race quietly
/// and the winner's row is read back.
pub(crate) async fn find_or_create_song(
    conn: &mut AsyncPgConnection,
    details: &SongDetails,
) -> QueryResult<SongRow> {
    let existing = find_song(conn, details).await?;
    if let Some(row) = existing {
        return Ok(row);
    }
    let inserted: Option<SongRow> = diesel::insert_into(songs::table)
        .values(&NewSongRow {
            title: details.title(),
            artist: details.artist(),
        })
        .on_conflict_do_nothing()
        .returning(SongRow::as_returning())
        .get_result(conn)
        .await
        .optional()?;
    match inserted {
        Some(row) => Ok(row),
        None => find_song(conn, details)
            .await?
            .ok_or(diesel::result::Error::NotFound),
    }
}

async fn find_song(
    conn: &mut AsyncPgConnection,
    details: &SongDetails,
) -> QueryResult<Option<SongRow>> {
    songs::table
        .filter(lower(songs::title).eq(lower(details.title())))
        .filter(lower(songs::artist).eq(lower(details.artist())))
        .select(SongRow::as_select())
        .order_by(songs::id)
        .first(conn)
        .await
        .optional()
}

#[derive(Clone)]
pub struct DieselSongRepository {
    pool: DbPool,
}

impl DieselSongRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SongRepository for DieselSongRepository {
    async fn find_or_create(&self, details: &SongDetails) -> Result<Song, SongRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SongRepositoryError::connection))?;
        find_or_create_song(&mut conn, details)
            .await
            .map(song_from_row)
            .map_err(|err| {
                map_diesel_error(
                    err,
                    SongRepositoryError::query,
                    SongRepositoryError::connection,
                )
            })
    }
}
