//! Port for the song catalogue.

use async_trait::async_trait;

use crate::domain::round::{Song, SongDetails};

use super::define_port_error;

define_port_error! {
    /// Errors raised by song repository adapters.
    pub enum SongRepositoryError {
        Connection { message: String } => "song repository connection failed: {message}",
        Query { message: String } => "song repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Return the song matching title and artist case-insensitively, creating
    /// it when absent.
    async fn find_or_create(&self, details: &SongDetails) -> Result<Song, SongRepositoryError>;
}
