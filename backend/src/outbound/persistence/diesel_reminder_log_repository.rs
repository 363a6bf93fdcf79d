//! PostgreSQL-backed `ReminderLogRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{ReminderLogRepository, ReminderLogRepositoryError};
use crate::domain::reminders::{ReminderKind, ReminderLogEntry};
use crate::domain::round::RoundId;

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewReminderRow;
use super::pool::{DbPool, PoolError};
use super::schema::email_reminders_sent;

#[derive(Clone)]
pub struct DieselReminderLogRepository {
    pool: DbPool,
}

impl DieselReminderLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ReminderLogRepositoryError {
    map_pool_error(error, ReminderLogRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ReminderLogRepositoryError {
    map_diesel_error(
        error,
        ReminderLogRepositoryError::query,
        ReminderLogRepositoryError::connection,
    )
}

#[async_trait]
impl ReminderLogRepository for DieselReminderLogRepository {
    async fn has_successful(
        &self,
        round_id: RoundId,
        user_id: UserId,
        kind: ReminderKind,
    ) -> Result<bool, ReminderLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(exists(
            email_reminders_sent::table
                .filter(email_reminders_sent::round_id.eq(round_id.0))
                .filter(email_reminders_sent::user_id.eq(user_id.as_uuid()))
                .filter(email_reminders_sent::reminder_type.eq(kind.as_str()))
                .filter(email_reminders_sent::success.eq(true)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(diesel_error)
    }

    async fn record(
        &self,
        round_id: RoundId,
        user_id: UserId,
        entry: &ReminderLogEntry,
        now: DateTime<Utc>,
    ) -> Result<(), ReminderLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(email_reminders_sent::table)
            .values(&NewReminderRow {
                round_id: round_id.0,
                user_id: *user_id.as_uuid(),
                reminder_type: entry.kind.as_str(),
                success: entry.success,
                error_message: entry.error_message.as_deref(),
                sent_at: now,
            })
            // A second success for the same reminder is dropped by the partial
            // unique index; failures are always logged.
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }
}
