//! Member participation: signing up, voting and submitting covers.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::notifications::Notifier;
use crate::domain::ports::{MyParticipation, ParticipationCommand, Repositories};
use crate::domain::round::{Round, RoundSlug, compute_phase};
use crate::domain::service_support::{
    find_round, map_signup_error, map_submission_error, map_vote_error, require_user,
};
use crate::domain::voting::{Ballot, StoredVote};
use crate::domain::{
    Error, ParticipationAction, Signup, SignupDraft, Submission, SubmissionDraft, UserId,
};

/// Phase-gated member actions with best-effort confirmation emails.
#[derive(Clone)]
pub struct ParticipationService {
    repos: Repositories,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl ParticipationService {
    pub fn new(repos: Repositories, clock: Arc<dyn Clock>, notifier: Notifier) -> Self {
        Self {
            repos,
            clock,
            notifier,
        }
    }

    fn ensure_open(&self, round: &Round, action: ParticipationAction) -> Result<(), Error> {
        let now = self.clock.utc();
        let phase = compute_phase(now, &round.milestones);
        if action.is_open(phase, round.milestones.window_position(now)) {
            Ok(())
        } else {
            Err(Error::conflict(action.closed_message()).with_details(serde_json::json!({
                "phase": phase.as_str(),
                "code": "phase_closed",
            })))
        }
    }
}

#[async_trait]
impl ParticipationCommand for ParticipationService {
    async fn sign_up(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        draft: SignupDraft,
    ) -> Result<Signup, Error> {
        let user = require_user(&self.repos, user_id).await?;
        let round = find_round(&self.repos, slug).await?;
        self.ensure_open(&round, ParticipationAction::SignUp)?;
        let signup = self
            .repos
            .signups
            .upsert(round.id, user.id, &draft, self.clock.utc())
            .await
            .map_err(map_signup_error)?;
        info!(user = %user.id, round = %round.slug, song_id = %signup.song.id, "member signed up");

        let templates = self.notifier.templates();
        self.notifier
            .send_best_effort(
                templates.signup_confirmation(&user, &round, &signup),
                "signup_confirmation",
            )
            .await;
        if let Some(admin_email) = self.notifier.admin_email() {
            self.notifier
                .send_best_effort(
                    templates.admin_signup_notification(admin_email, &user, &round, &signup),
                    "admin_signup_notification",
                )
                .await;
        }
        Ok(signup)
    }

    async fn vote(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        ballot: Ballot,
    ) -> Result<Vec<StoredVote>, Error> {
        let user = require_user(&self.repos, user_id).await?;
        let round = find_round(&self.repos, slug).await?;
        self.ensure_open(&round, ParticipationAction::Vote)?;

        let options: HashSet<_> = self
            .repos
            .signups
            .voting_options(round.id)
            .await
            .map_err(map_signup_error)?
            .into_iter()
            .map(|song| song.id)
            .collect();
        if let Some(unknown) = ballot.song_ids().find(|id| !options.contains(id)) {
            return Err(
                Error::invalid_request(format!("song {unknown} is not a voting option"))
                    .with_details(serde_json::json!({ "field": "votes", "code": "unknown_song" })),
            );
        }

        self.repos
            .votes
            .replace_ballot(round.id, user.id, &ballot, self.clock.utc())
            .await
            .map_err(map_vote_error)?;
        let votes = self
            .repos
            .votes
            .list_for_user(round.id, user.id)
            .await
            .map_err(map_vote_error)?;
        info!(user = %user.id, round = %round.slug, votes = votes.len(), "ballot recorded");
        self.notifier
            .send_best_effort(
                self.notifier
                    .templates()
                    .voting_confirmation(&user, &round, &votes),
                "voting_confirmation",
            )
            .await;
        Ok(votes)
    }

    async fn submit_cover(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
        draft: SubmissionDraft,
    ) -> Result<Submission, Error> {
        let user = require_user(&self.repos, user_id).await?;
        let round = find_round(&self.repos, slug).await?;
        self.ensure_open(&round, ParticipationAction::Submit)?;
        let signed_up = self
            .repos
            .signups
            .find_for_user(round.id, user.id)
            .await
            .map_err(map_signup_error)?
            .is_some();
        if !signed_up {
            return Err(Error::forbidden(
                "only members who signed up can submit a cover",
            ));
        }
        let submission = self
            .repos
            .submissions
            .upsert(round.id, user.id, &draft, self.clock.utc())
            .await
            .map_err(map_submission_error)?;
        info!(user = %user.id, round = %round.slug, "cover submitted");
        self.notifier
            .send_best_effort(
                self.notifier
                    .templates()
                    .submission_confirmation(&user, &round, &submission),
                "submission_confirmation",
            )
            .await;
        Ok(submission)
    }

    async fn my_participation(
        &self,
        user_id: UserId,
        slug: &RoundSlug,
    ) -> Result<MyParticipation, Error> {
        let user = require_user(&self.repos, user_id).await?;
        let round = find_round(&self.repos, slug).await?;
        let signup = self
            .repos
            .signups
            .find_for_user(round.id, user.id)
            .await
            .map_err(map_signup_error)?;
        let votes = self
            .repos
            .votes
            .list_for_user(round.id, user.id)
            .await
            .map_err(map_vote_error)?;
        let submission = self
            .repos
            .submissions
            .find_for_user(round.id, user.id)
            .await
            .map_err(map_submission_error)?;
        Ok(MyParticipation {
            phase: compute_phase(self.clock.utc(), &round.milestones),
            signup,
            votes,
            submission,
        })
    }
}
