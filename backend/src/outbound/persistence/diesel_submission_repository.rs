//! PostgreSQL-backed `SubmissionRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubmissionRepository, SubmissionRepositoryError};
use crate::domain::round::RoundId;
use crate::domain::{SoundcloudUrl, Submission, SubmissionDraft, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewSubmissionRow, SubmissionRow};
use super::pool::{DbPool, PoolError};
use super::schema::submissions;

#[derive(Clone)]
pub struct DieselSubmissionRepository {
    pool: DbPool,
}

impl DieselSubmissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> SubmissionRepositoryError {
    map_pool_error(error, SubmissionRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SubmissionRepositoryError {
    map_diesel_error(
        error,
        SubmissionRepositoryError::query,
        SubmissionRepositoryError::connection,
    )
}

fn to_submission(row: SubmissionRow) -> Submission {
    Submission {
        id: row.id,
        round_id: RoundId(row.round_id),
        user_id: UserId::from_uuid(row.user_id),
        soundcloud_url: SoundcloudUrl::from_stored(row.soundcloud_url),
        additional_comments: row.additional_comments,
        created_at: row.created_at,
    }
}

fn new_row<'a>(
    round_id: RoundId,
    user_id: UserId,
    draft: &'a SubmissionDraft,
    now: DateTime<Utc>,
) -> NewSubmissionRow<'a> {
    NewSubmissionRow {
        round_id: round_id.0,
        user_id: *user_id.as_uuid(),
        soundcloud_url: draft.soundcloud_url.as_ref(),
        additional_comments: draft.additional_comments.as_deref(),
        created_at: now,
    }
}

#[async_trait]
impl SubmissionRepository for DieselSubmissionRepository {
    async fn upsert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: SubmissionRow = diesel::insert_into(submissions::table)
            .values(&new_row(round_id, user_id, draft, now))
            .on_conflict((submissions::round_id, submissions::user_id))
            .do_update()
            .set((
                submissions::soundcloud_url.eq(excluded(submissions::soundcloud_url)),
                submissions::additional_comments.eq(excluded(submissions::additional_comments)),
                submissions::created_at.eq(excluded(submissions::created_at)),
            ))
            .returning(SubmissionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(to_submission(row))
    }

    async fn insert(
        &self,
        round_id: RoundId,
        user_id: UserId,
        draft: &SubmissionDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: SubmissionRow = diesel::insert_into(submissions::table)
            .values(&new_row(round_id, user_id, draft, now))
            .returning(SubmissionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(_) => SubmissionRepositoryError::duplicate(round_id.0),
                None => diesel_error(err),
            })?;
        Ok(to_submission(row))
    }

    async fn find_for_user(
        &self,
        round_id: RoundId,
        user_id: UserId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<SubmissionRow> = submissions::table
            .filter(submissions::round_id.eq(round_id.0))
            .filter(submissions::user_id.eq(user_id.as_uuid()))
            .select(SubmissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(to_submission))
    }

    async fn list_for_round(
        &self,
        round_id: RoundId,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<SubmissionRow> = submissions::table
            .filter(submissions::round_id.eq(round_id.0))
            .select(SubmissionRow::as_select())
            .order_by((submissions::created_at.asc(), submissions::id.asc()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows.into_iter().map(to_submission).collect())
    }
}
