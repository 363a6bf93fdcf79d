//! Transactional email templates and best-effort delivery.
//!
//! Templates render small HTML fragments. Every interpolated value passes
//! through [`escape_html`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{EmailMessage, EmailReceipt, EmailSender, EmailSenderError};
use crate::domain::reminders::ReminderKind;
use crate::domain::round::{Round, format_phase_label};
use crate::domain::voting::{SongTally, StoredVote};
use crate::domain::{Signup, Submission, User};

/// Links and addresses used when rendering emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub base_url: String,
    pub admin_email: Option<String>,
}

impl NotificationSettings {
    pub fn new(base_url: impl Into<String>, admin_email: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            admin_email,
        }
    }

    fn round_url(&self, round: &Round) -> String {
        format!("{}/round/{}", self.base_url, round.slug)
    }

    fn dashboard_url(&self) -> String {
        format!("{}/dashboard", self.base_url)
    }

    /// Link a member follows to finish logging in.
    pub fn login_url(&self, raw_token: &str) -> String {
        format!("{}/login/verify?token={raw_token}", self.base_url)
    }
}

/// Escape text for inclusion in HTML.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn message(to: &str, subject: String, body: String) -> EmailMessage {
    EmailMessage {
        to: to.to_owned(),
        subject,
        html: format!("<div>{body}</div>"),
        reply_to: None,
    }
}

fn link(url: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape_html(url), escape_html(text))
}

/// Renders every email the service sends.
#[derive(Debug, Clone)]
pub struct EmailTemplates {
    settings: NotificationSettings,
}

impl EmailTemplates {
    pub fn new(settings: NotificationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    pub fn login_link(&self, user: &User, raw_token: &str) -> EmailMessage {
        let url = self.settings.login_url(raw_token);
        message(
            user.email.as_ref(),
            "Your Everyone Plays the Same Song login link".to_owned(),
            format!(
                "<p>Hi {},</p><p>{}</p><p>The link expires soon and works once.</p>",
                escape_html(user.greeting_name()),
                link(&url, "Log in"),
            ),
        )
    }

    pub fn signup_confirmation(&self, user: &User, round: &Round, signup: &Signup) -> EmailMessage {
        let voting = format_phase_label(round.milestones.voting_opens());
        message(
            user.email.as_ref(),
            format!("You're signed up for round {}", round.slug),
            format!(
                "<p>Hi {},</p><p>You suggested <strong>{}</strong> by {}.</p>\
                 <p>Voting opens {}. {}</p>",
                escape_html(user.greeting_name()),
                escape_html(&signup.song.title),
                escape_html(&signup.song.artist),
                escape_html(&voting),
                link(&self.settings.round_url(round), "View the round"),
            ),
        )
    }

    pub fn admin_signup_notification(
        &self,
        admin_email: &str,
        user: &User,
        round: &Round,
        signup: &Signup,
    ) -> EmailMessage {
        message(
            admin_email,
            format!("New signup for round {}", round.slug),
            format!(
                "<p>{} ({}) signed up with <strong>{}</strong> by {}.</p><p>{}</p>",
                escape_html(user.username.as_ref()),
                escape_html(user.email.as_ref()),
                escape_html(&signup.song.title),
                escape_html(&signup.song.artist),
                link(signup.youtube_link.as_ref(), "Reference recording"),
            ),
        )
    }

    pub fn voting_confirmation(
        &self,
        user: &User,
        round: &Round,
        votes: &[StoredVote],
    ) -> EmailMessage {
        let rows: String = votes
            .iter()
            .map(|vote| {
                format!(
                    "<li>{} by {}: {}/5</li>",
                    escape_html(&vote.song.title),
                    escape_html(&vote.song.artist),
                    vote.score.value()
                )
            })
            .collect();
        message(
            user.email.as_ref(),
            format!("Your votes for round {}", round.slug),
            format!(
                "<p>Hi {},</p><p>Thanks for voting. Your ballot:</p><ul>{rows}</ul>\
                 <p>Covering begins {}.</p>",
                escape_html(user.greeting_name()),
                escape_html(&format_phase_label(round.milestones.covering_begins())),
            ),
        )
    }

    pub fn submission_confirmation(
        &self,
        user: &User,
        round: &Round,
        submission: &Submission,
    ) -> EmailMessage {
        message(
            user.email.as_ref(),
            format!("Cover received for round {}", round.slug),
            format!(
                "<p>Hi {},</p><p>We received your cover: {}.</p>\
                 <p>The listening party is {}.</p>",
                escape_html(user.greeting_name()),
                link(submission.soundcloud_url.as_ref(), "listen"),
                escape_html(&format_phase_label(round.milestones.listening_party())),
            ),
        )
    }

    pub fn admin_song_assigned(
        &self,
        admin_email: &str,
        round: &Round,
        tally: &SongTally,
    ) -> EmailMessage {
        message(
            admin_email,
            format!("Round {} song assigned", round.slug),
            format!(
                "<p><strong>{}</strong> by {} won with an average of {:.2} from {} votes.</p>",
                escape_html(&tally.song.title),
                escape_html(&tally.song.artist),
                tally.average_rounded(),
                tally.votes_count,
            ),
        )
    }

    pub fn reminder(
        &self,
        kind: ReminderKind,
        user: &User,
        round: &Round,
        has_submitted: bool,
    ) -> EmailMessage {
        let due = escape_html(&format_phase_label(round.milestones.covers_due()));
        let song = round
            .song
            .as_ref()
            .map(|song| {
                format!(
                    "<strong>{}</strong> by {}",
                    escape_html(&song.title),
                    escape_html(&song.artist)
                )
            })
            .unwrap_or_else(|| "this round's song".to_owned());
        let (subject, lead) = match kind {
            ReminderKind::VotingClosesTomorrow => (
                "Voting closes soon".to_owned(),
                format!(
                    "Voting for round {} closes {}. Cast your votes now.",
                    escape_html(round.slug.as_ref()),
                    escape_html(&format_phase_label(round.milestones.covering_begins())),
                ),
            ),
            ReminderKind::CoveringHalfway => (
                "Halfway through the covering phase".to_owned(),
                format!("We're halfway through covering {song}. Covers are due {due}."),
            ),
            ReminderKind::CoveringOneMonthLeft if has_submitted => (
                "One month until covers are due".to_owned(),
                format!("Thanks for submitting already! Covers for {song} are due {due}."),
            ),
            ReminderKind::CoveringOneMonthLeft => (
                "One month until covers are due".to_owned(),
                format!("About a month left to record {song}. Covers are due {due}."),
            ),
            ReminderKind::CoveringLastWeek if has_submitted => (
                "Last week of covering".to_owned(),
                format!("Your cover is in. Everyone else has until {due}."),
            ),
            ReminderKind::CoveringLastWeek => (
                "Last week of covering".to_owned(),
                format!("One week left to submit your cover of {song}. Covers are due {due}."),
            ),
            ReminderKind::CoversDueTomorrow if has_submitted => (
                "Covers are due tomorrow".to_owned(),
                "Your cover is in. See you at the listening party!".to_owned(),
            ),
            ReminderKind::CoversDueTomorrow => (
                "Covers are due tomorrow".to_owned(),
                format!("Covers for {song} are due {due}. Submit yours before the deadline."),
            ),
        };
        message(
            user.email.as_ref(),
            subject,
            format!(
                "<p>Hi {},</p><p>{lead}</p><p>{}</p>",
                escape_html(user.greeting_name()),
                link(&self.settings.dashboard_url(), "Open your dashboard"),
            ),
        )
    }
}

/// Sends rendered emails.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    templates: EmailTemplates,
}

impl Notifier {
    pub fn new(sender: Arc<dyn EmailSender>, settings: NotificationSettings) -> Self {
        Self {
            sender,
            templates: EmailTemplates::new(settings),
        }
    }

    pub fn templates(&self) -> &EmailTemplates {
        &self.templates
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.templates.settings().admin_email.as_deref()
    }

    /// Send and report the outcome.
    pub async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailSenderError> {
        self.sender.send(message).await
    }

    /// Send, logging failures instead of returning them.
    pub async fn send_best_effort(&self, message: EmailMessage, purpose: &'static str) {
        match self.sender.send(&message).await {
            Ok(receipt) => info!(purpose, email_id = %receipt.id, "email sent"),
            Err(error) => warn!(purpose, %error, "email delivery failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockEmailSender;
    use crate::domain::round::{
        MilestoneDates, RoundId, RoundMilestones, RoundSlug, Song, SongId,
    };
    use crate::domain::{EmailAddress, UserId, Username, YoutubeLink};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn user() -> User {
        User {
            id: UserId::random(),
            email: EmailAddress::new("ada@example.com").expect("email"),
            username: Username::new("ada").expect("username"),
            full_name: Some("Ada <Lovelace>".to_owned()),
            admin_level: 0,
        }
    }

    #[fixture]
    fn round() -> Round {
        let at = |m, d| Utc.with_ymd_and_hms(2022, m, d, 0, 0, 0).single().expect("date");
        Round {
            id: RoundId(1),
            slug: RoundSlug::new("2022-10-01").expect("slug"),
            playlist_url: None,
            song: None,
            milestones: RoundMilestones::try_new(MilestoneDates {
                signup_opens: at(11, 17),
                voting_opens: at(12, 6),
                covering_begins: at(12, 17),
                covers_due: at(12, 28),
                listening_party: at(12, 30),
            })
            .expect("ordered"),
        }
    }

    #[fixture]
    fn templates() -> EmailTemplates {
        EmailTemplates::new(NotificationSettings::new(
            "https://eptss.test/",
            Some("admin@eptss.test".to_owned()),
        ))
    }

    #[rstest]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[rstest]
    fn login_link_points_at_verify_route(templates: EmailTemplates) {
        let email = templates.login_link(&user(), "abc123");
        assert_eq!(email.to, "ada@example.com");
        assert!(email.html.contains("https://eptss.test/login/verify?token=abc123"));
        assert!(email.html.contains("Ada &lt;Lovelace&gt;"));
    }

    #[rstest]
    fn signup_confirmation_mentions_song_and_voting_date(templates: EmailTemplates, round: Round) {
        let signup = Signup {
            id: 1,
            round_id: round.id,
            user_id: UserId::random(),
            song: Song {
                id: SongId(1),
                title: "Rock & Roll".to_owned(),
                artist: "Zep".to_owned(),
            },
            youtube_link: YoutubeLink::from_stored("https://youtu.be/x".to_owned()),
            additional_comments: None,
            created_at: Utc::now(),
        };
        let email = templates.signup_confirmation(&user(), &round, &signup);
        assert!(email.subject.contains("2022-10-01"));
        assert!(email.html.contains("Rock &amp; Roll"));
        assert!(email.html.contains("Tuesday, Dec 6th"));
    }

    #[rstest]
    #[case(true, "Your cover is in")]
    #[case(false, "One week left")]
    fn last_week_reminder_depends_on_submission(
        templates: EmailTemplates,
        round: Round,
        #[case] submitted: bool,
        #[case] expected: &str,
    ) {
        let email = templates.reminder(ReminderKind::CoveringLastWeek, &user(), &round, submitted);
        assert!(email.html.contains(expected), "{}", email.html);
    }

    #[rstest]
    #[tokio::test]
    async fn best_effort_swallows_failures(templates: EmailTemplates) {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .times(1)
            .return_once(|_| Err(EmailSenderError::transport("offline")));
        let notifier = Notifier::new(Arc::new(sender), templates.settings().clone());
        let email = templates.login_link(&user(), "t");
        notifier.send_best_effort(email, "login_link").await;
    }
}
