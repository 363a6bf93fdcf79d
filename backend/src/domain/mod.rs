//! Domain primitives, services and ports.
//!
//! Purpose: hold the round lifecycle rules and the use-cases built on them.
//! Nothing in here depends on Actix or Diesel; adapters live under
//! `inbound` and `outbound`.
//!
//! Public surface:
//! - `round`: milestones, phase calculation, date ranges and labels.
//! - `schedule`: quarterly round planning.
//! - `voting`, `participation`, `reminders`: participation rules.
//! - Services implementing the driving ports in `ports`.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod notifications;
pub mod participation;
pub mod participation_service;
pub mod ports;
pub mod reminders;
pub mod round;
pub mod round_admin_service;
pub mod round_query_service;
pub mod schedule;
pub mod scheduled_jobs_service;
mod service_support;
pub mod trace_id;
pub mod user;
pub mod voting;

pub use self::account_service::{AccountService, DEFAULT_LOGIN_TOKEN_TTL_MINUTES};
pub use self::auth::{LoginToken, constant_time_eq, hash_login_token};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notifications::{EmailTemplates, NotificationSettings, Notifier};
pub use self::participation::{
    ParticipationAction, ParticipationValidationError, Signup, SignupDraft, SoundcloudUrl,
    Submission, SubmissionDraft, YoutubeLink,
};
pub use self::participation_service::ParticipationService;
pub use self::round_admin_service::RoundAdminService;
pub use self::round_query_service::RoundQueryService;
pub use self::scheduled_jobs_service::{REQUIRED_FUTURE_ROUNDS, ScheduledJobsService};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, NewUser, User, UserId, UserValidationError, Username};
