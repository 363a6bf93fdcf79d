//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Phase rules and validation live in the domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Revalidated reads**: stored rounds and users pass through the domain
//!   constructors again, so a corrupt row surfaces as an error instead of a
//!   silently wrong phase.
//!
//! # Example
//!
//! ```ignore
//! use eptss::outbound::persistence::{DbPool, PoolConfig, diesel_repositories};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/eptss")).await?;
//! let repos = diesel_repositories(&pool);
//! ```

use std::sync::Arc;

use crate::domain::ports::Repositories;

mod diesel_basic_error_mapping;
mod diesel_login_token_repository;
mod diesel_reminder_log_repository;
mod diesel_round_repository;
mod diesel_signup_repository;
mod diesel_song_repository;
mod diesel_submission_repository;
mod diesel_user_repository;
mod diesel_vote_repository;
mod migrations;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_login_token_repository::DieselLoginTokenRepository;
pub use diesel_reminder_log_repository::DieselReminderLogRepository;
pub use diesel_round_repository::DieselRoundRepository;
pub use diesel_signup_repository::DieselSignupRepository;
pub use diesel_song_repository::DieselSongRepository;
pub use diesel_submission_repository::DieselSubmissionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Build the full repository bundle over a shared pool.
pub fn diesel_repositories(pool: &DbPool) -> Repositories {
    Repositories {
        rounds: Arc::new(DieselRoundRepository::new(pool.clone())),
        songs: Arc::new(DieselSongRepository::new(pool.clone())),
        signups: Arc::new(DieselSignupRepository::new(pool.clone())),
        votes: Arc::new(DieselVoteRepository::new(pool.clone())),
        submissions: Arc::new(DieselSubmissionRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        login_tokens: Arc::new(DieselLoginTokenRepository::new(pool.clone())),
        reminder_log: Arc::new(DieselReminderLogRepository::new(pool.clone())),
    }
}
