//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, email) are implemented by outbound adapters.
//! Driving ports (queries and commands) are implemented by domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod email_sender;
mod login_token_repository;
mod participation_command;
mod reminder_log_repository;
mod repositories;
mod round_admin_command;
mod round_query;
mod round_repository;
mod scheduled_jobs_command;
mod signup_repository;
mod song_repository;
mod submission_repository;
mod user_repository;
mod vote_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, FixtureAccountCommand};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailMessage, EmailReceipt, EmailSender, EmailSenderError};
#[cfg(test)]
pub use login_token_repository::MockLoginTokenRepository;
pub use login_token_repository::{LoginTokenRepository, LoginTokenRepositoryError};
#[cfg(test)]
pub use participation_command::MockParticipationCommand;
pub use participation_command::{
    FixtureParticipationCommand, MyParticipation, ParticipationCommand,
};
#[cfg(test)]
pub use reminder_log_repository::MockReminderLogRepository;
pub use reminder_log_repository::{ReminderLogRepository, ReminderLogRepositoryError};
pub use repositories::Repositories;
#[cfg(test)]
pub use round_admin_command::MockRoundAdminCommand;
pub use round_admin_command::{
    FixtureRoundAdminCommand, RoundAdminCommand, RoundReport, RoundUpdate,
};
#[cfg(test)]
pub use round_query::MockRoundQuery;
pub use round_query::{FixtureRoundQuery, RoundOverview, RoundQuery};
#[cfg(test)]
pub use round_repository::MockRoundRepository;
pub use round_repository::{RoundRepository, RoundRepositoryError};
#[cfg(test)]
pub use scheduled_jobs_command::MockScheduledJobsCommand;
pub use scheduled_jobs_command::{
    AssignSongOutcome, FixtureScheduledJobsCommand, FutureRoundsReport, ReminderKindReport,
    ReminderRunReport, ScheduledJobsCommand, SlugError,
};
#[cfg(test)]
pub use signup_repository::MockSignupRepository;
pub use signup_repository::{RoundParticipant, SignupRepository, SignupRepositoryError};
#[cfg(test)]
pub use song_repository::MockSongRepository;
pub use song_repository::{SongRepository, SongRepositoryError};
#[cfg(test)]
pub use submission_repository::MockSubmissionRepository;
pub use submission_repository::{SubmissionRepository, SubmissionRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use vote_repository::MockVoteRepository;
pub use vote_repository::{VoteRepository, VoteRepositoryError};
