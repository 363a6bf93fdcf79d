//! Driving port for read-only round views.
//!
//! Inbound adapters use [`RoundQuery`] to show the current round, its phase
//! timeline, voting options and results.

use async_trait::async_trait;

use crate::domain::round::{Round, RoundSlug, RoundTimeline, Song};
use crate::domain::voting::SongTally;
use crate::domain::{Error, UserId};

/// A round with its derived timeline and participation counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOverview {
    pub round: Round,
    pub timeline: RoundTimeline,
    pub signup_count: usize,
    pub submission_count: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundQuery: Send + Sync {
    /// The round open now, or the next upcoming one.
    async fn current_round(&self) -> Result<RoundOverview, Error>;

    async fn round_overview(&self, slug: &RoundSlug) -> Result<RoundOverview, Error>;

    /// Every round, newest first, with timelines.
    async fn list_rounds(&self) -> Result<Vec<RoundOverview>, Error>;

    /// Rounds scheduled after the current one.
    async fn future_rounds(&self) -> Result<Vec<RoundOverview>, Error>;

    async fn voting_options(&self, slug: &RoundSlug) -> Result<Vec<Song>, Error>;

    /// Tallied results; hidden until voting closes unless `viewer` is an admin.
    async fn vote_results(
        &self,
        slug: &RoundSlug,
        viewer: Option<UserId>,
    ) -> Result<Vec<SongTally>, Error>;
}

/// Round query used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoundQuery;

#[async_trait]
impl RoundQuery for FixtureRoundQuery {
    async fn current_round(&self) -> Result<RoundOverview, Error> {
        Err(Error::not_found("no current round"))
    }

    async fn round_overview(&self, slug: &RoundSlug) -> Result<RoundOverview, Error> {
        Err(Error::not_found(format!("round {slug} not found")))
    }

    async fn list_rounds(&self) -> Result<Vec<RoundOverview>, Error> {
        Ok(Vec::new())
    }

    async fn future_rounds(&self) -> Result<Vec<RoundOverview>, Error> {
        Ok(Vec::new())
    }

    async fn voting_options(&self, slug: &RoundSlug) -> Result<Vec<Song>, Error> {
        Err(Error::not_found(format!("round {slug} not found")))
    }

    async fn vote_results(
        &self,
        slug: &RoundSlug,
        _viewer: Option<UserId>,
    ) -> Result<Vec<SongTally>, Error> {
        Err(Error::not_found(format!("round {slug} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_has_no_rounds() {
        let query = FixtureRoundQuery;
        let slug = RoundSlug::new("2024-01-01").expect("valid slug");
        assert!(query.list_rounds().await.expect("list").is_empty());
        let err = query.round_overview(&slug).await.expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
