//! Bundle of driven ports shared by the domain services.

use std::sync::Arc;

use super::{
    LoginTokenRepository, ReminderLogRepository, RoundRepository, SignupRepository,
    SongRepository, SubmissionRepository, UserRepository, VoteRepository,
};

/// Parameter object holding every repository a service may need.
#[derive(Clone)]
pub struct Repositories {
    pub rounds: Arc<dyn RoundRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub signups: Arc<dyn SignupRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub login_tokens: Arc<dyn LoginTokenRepository>,
    pub reminder_log: Arc<dyn ReminderLogRepository>,
}
