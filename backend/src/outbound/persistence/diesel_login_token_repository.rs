//! PostgreSQL-backed `LoginTokenRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{LoginTokenRepository, LoginTokenRepositoryError};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewLoginTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::login_tokens;

#[derive(Clone)]
pub struct DieselLoginTokenRepository {
    pool: DbPool,
}

impl DieselLoginTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> LoginTokenRepositoryError {
    map_pool_error(error, LoginTokenRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> LoginTokenRepositoryError {
    map_diesel_error(
        error,
        LoginTokenRepositoryError::query,
        LoginTokenRepositoryError::connection,
    )
}

#[async_trait]
impl LoginTokenRepository for DieselLoginTokenRepository {
    async fn store(
        &self,
        token_hash: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LoginTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(login_tokens::table)
            .values(&NewLoginTokenRow {
                token_hash,
                user_id: *user_id.as_uuid(),
                expires_at,
            })
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn consume(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, LoginTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // A single conditional update keeps concurrent verifications from
        // both succeeding.
        let owner: Option<Uuid> = diesel::update(
            login_tokens::table
                .filter(login_tokens::token_hash.eq(token_hash))
                .filter(login_tokens::consumed_at.is_null())
                .filter(login_tokens::expires_at.gt(now)),
        )
        .set(login_tokens::consumed_at.eq(Some(now)))
        .returning(login_tokens::user_id)
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;
        Ok(owner.map(UserId::from_uuid))
    }

    async fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, LoginTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(
            login_tokens::table.filter(
                login_tokens::expires_at
                    .le(now)
                    .or(login_tokens::consumed_at.is_not_null()),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)
    }
}
