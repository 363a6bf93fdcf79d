//! Admin round management implementing [`RoundAdminCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{Repositories, RoundAdminCommand, RoundReport, RoundUpdate};
use crate::domain::round::{NewRound, Round, RoundSlug, SongDetails};
use crate::domain::service_support::{
    find_round, map_round_error, map_signup_error, map_song_error, map_submission_error,
    map_user_error, map_vote_error, overview, require_admin,
};
use crate::domain::voting::tally_votes;
use crate::domain::{Error, Submission, SubmissionDraft, UserId};

/// Admin use-cases; every call verifies the actor's admin level first.
#[derive(Clone)]
pub struct RoundAdminService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
}

impl RoundAdminService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }
}

fn milestone_error(error: crate::domain::round::MilestoneOrderError) -> Error {
    Error::invalid_request(error.to_string()).with_details(serde_json::json!({
        "field": error.field(),
        "code": "invalid_milestones",
    }))
}

#[async_trait]
impl RoundAdminCommand for RoundAdminService {
    async fn create_round(&self, actor: UserId, round: NewRound) -> Result<Round, Error> {
        let admin = require_admin(&self.repos, actor).await?;
        let created = self
            .repos
            .rounds
            .insert(&round)
            .await
            .map_err(map_round_error)?;
        info!(admin = %admin.id, round = %created.slug, "round created");
        Ok(created)
    }

    async fn update_round(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        update: RoundUpdate,
    ) -> Result<Round, Error> {
        require_admin(&self.repos, actor).await?;
        let round = find_round(&self.repos, slug).await?;
        let milestones = round
            .milestones
            .patched(update.milestones)
            .map_err(milestone_error)?;
        let playlist_url = update.playlist_url.unwrap_or(round.playlist_url);
        self.repos
            .rounds
            .update(round.id, &milestones, playlist_url)
            .await
            .map_err(map_round_error)
    }

    async fn set_round_song(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        song: SongDetails,
    ) -> Result<Round, Error> {
        require_admin(&self.repos, actor).await?;
        let round = find_round(&self.repos, slug).await?;
        let song = self
            .repos
            .songs
            .find_or_create(&song)
            .await
            .map_err(map_song_error)?;
        self.repos
            .rounds
            .set_song(round.id, song.id)
            .await
            .map_err(map_round_error)?;
        info!(round = %round.slug, song_id = %song.id, "round song set by admin");
        Ok(Round {
            song: Some(song),
            ..round
        })
    }

    async fn round_report(&self, actor: UserId, slug: &RoundSlug) -> Result<RoundReport, Error> {
        require_admin(&self.repos, actor).await?;
        let round = find_round(&self.repos, slug).await?;
        let round_id = round.id;
        let participants = self
            .repos
            .signups
            .list_participants(round_id)
            .await
            .map_err(map_signup_error)?;
        let votes = self
            .repos
            .votes
            .list_for_round(round_id)
            .await
            .map_err(map_vote_error)?;
        let submissions = self
            .repos
            .submissions
            .list_for_round(round_id)
            .await
            .map_err(map_submission_error)?;
        Ok(RoundReport {
            overview: overview(&self.repos, round, self.clock.utc()).await?,
            participants,
            results: tally_votes(&votes),
            submissions,
        })
    }

    async fn submit_for_user(
        &self,
        actor: UserId,
        slug: &RoundSlug,
        user_id: UserId,
        draft: SubmissionDraft,
    ) -> Result<Submission, Error> {
        require_admin(&self.repos, actor).await?;
        let round = find_round(&self.repos, slug).await?;
        self.repos
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        self.repos
            .submissions
            .insert(round.id, user_id, &draft, self.clock.utc())
            .await
            .map_err(map_submission_error)
    }
}
