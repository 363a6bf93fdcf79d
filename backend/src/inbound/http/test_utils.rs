//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::RoundOverview;
use crate::domain::round::{
    MilestoneDates, Round, RoundId, RoundMilestones, RoundSlug, RoundTimeline, Song, SongId,
};
use crate::domain::{EmailAddress, Error, User, UserId, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::MemberSession;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Route target that logs in the user named in the path. Mount it at
/// `/test/login/{id}`.
pub async fn test_login(
    session: MemberSession,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = UserId::new(id.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.sign_in(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Session cookie set on `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub fn sample_song(id: i64, title: &str) -> Song {
    Song {
        id: SongId(id),
        title: title.to_owned(),
        artist: "The Band".to_owned(),
    }
}

/// Quarter-style milestones for the round starting on 1 January 2024.
pub fn sample_milestones() -> RoundMilestones {
    RoundMilestones::try_new(MilestoneDates {
        signup_opens: utc(2024, 1, 1),
        voting_opens: utc(2024, 1, 21),
        covering_begins: utc(2024, 1, 28),
        covers_due: utc(2024, 3, 24),
        listening_party: utc(2024, 3, 30),
    })
    .expect("ordered milestones")
}

pub fn sample_round(slug: &str) -> Round {
    Round {
        id: RoundId(1),
        slug: RoundSlug::new(slug).expect("valid slug"),
        playlist_url: None,
        song: None,
        milestones: sample_milestones(),
    }
}

pub fn sample_overview(slug: &str, now: DateTime<Utc>) -> RoundOverview {
    let round = sample_round(slug);
    let timeline = RoundTimeline::at(now, &round.milestones);
    RoundOverview {
        round,
        timeline,
        signup_count: 0,
        submission_count: 0,
    }
}

pub const MEMBER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
pub const ADMIN_ID: &str = "11111111-2222-3333-4444-555555555555";

pub fn sample_user(id: &str, admin_level: i16) -> User {
    User {
        id: UserId::new(id).expect("valid id"),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
        username: Username::new("ada").expect("valid username"),
        full_name: Some("Ada Lovelace".to_owned()),
        admin_level,
    }
}
