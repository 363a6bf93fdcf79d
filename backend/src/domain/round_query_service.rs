//! Read-side round service implementing [`RoundQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{Repositories, RoundOverview, RoundQuery};
use crate::domain::round::{Phase, RoundSlug, Song, compute_phase};
use crate::domain::service_support::{
    current_round, find_round, map_round_error, map_signup_error, map_user_error,
    map_vote_error, overview,
};
use crate::domain::voting::{SongTally, tally_votes};
use crate::domain::{Error, UserId};

/// Round views backed by the repositories.
#[derive(Clone)]
pub struct RoundQueryService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl RoundQueryService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    async fn viewer_is_admin(&self, viewer: Option<UserId>) -> Result<bool, Error> {
        let Some(user_id) = viewer else {
            return Ok(false);
        };
        let user = self
            .repos
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?;
        Ok(user.is_some_and(|user| user.is_admin()))
    }
}

#[async_trait]
impl RoundQuery for RoundQueryService {
    async fn current_round(&self) -> Result<RoundOverview, Error> {
        let now = self.clock.utc();
        let round = current_round(&self.repos, now)
            .await?
            .ok_or_else(|| Error::not_found("no current round"))?;
        overview(&self.repos, round, now).await
    }

    async fn round_overview(&self, slug: &RoundSlug) -> Result<RoundOverview, Error> {
        let round = find_round(&self.repos, slug).await?;
        overview(&self.repos, round, self.clock.utc()).await
    }

    async fn list_rounds(&self) -> Result<Vec<RoundOverview>, Error> {
        let now = self.clock.utc();
        let rounds = self.repos.rounds.list_all().await.map_err(map_round_error)?;
        let mut overviews = Vec::with_capacity(rounds.len());
        for round in rounds {
            overviews.push(overview(&self.repos, round, now).await?);
        }
        Ok(overviews)
    }

    async fn future_rounds(&self) -> Result<Vec<RoundOverview>, Error> {
        let now = self.clock.utc();
        let Some(current) = current_round(&self.repos, now).await? else {
            return Ok(Vec::new());
        };
        let rounds = self
            .repos
            .rounds
            .list_voting_after(current.milestones.voting_opens())
            .await
            .map_err(map_round_error)?;
        let mut overviews = Vec::with_capacity(rounds.len());
        for round in rounds {
            overviews.push(overview(&self.repos, round, now).await?);
        }
        Ok(overviews)
    }

    async fn voting_options(&self, slug: &RoundSlug) -> Result<Vec<Song>, Error> {
        let round = find_round(&self.repos, slug).await?;
        self.repos
            .signups
            .voting_options(round.id)
            .await
            .map_err(map_signup_error)
    }

    async fn vote_results(
        &self,
        slug: &RoundSlug,
        viewer: Option<UserId>,
    ) -> Result<Vec<SongTally>, Error> {
        let round = find_round(&self.repos, slug).await?;
        let phase = compute_phase(self.clock.utc(), &round.milestones);
        if phase < Phase::Covering && !self.viewer_is_admin(viewer).await? {
            return Err(Error::forbidden("results are hidden until voting closes"));
        }
        let votes = self
            .repos
            .votes
            .list_for_round(round.id)
            .await
            .map_err(map_vote_error)?;
        Ok(tally_votes(&votes))
    }
}
