//! Member session extractor.
//!
//! The private session cookie carries only the signed-in member's id. Handlers
//! take a [`MemberSession`] and ask for either the optional viewer (public
//! pages that reveal more to admins) or a required member (participation,
//! admin and `/me`).

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const MEMBER_ID_KEY: &str = "member_id";

/// Session of the caller, signed in or anonymous.
#[derive(Clone)]
pub struct MemberSession(Session);

impl MemberSession {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record a verified login. The session id is rotated so a cookie issued
    /// before login never carries the member's identity.
    pub fn sign_in(&self, member: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(MEMBER_ID_KEY, member.to_string())
            .map_err(|err| Error::internal(format!("cannot store session: {err}")))
    }

    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in member, or `None` for anonymous callers.
    ///
    /// A cookie whose id does not parse is treated as anonymous and cleared.
    pub fn viewer(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(MEMBER_ID_KEY)
            .map_err(|err| Error::internal(format!("cannot read session: {err}")))?;
        let Some(raw) = stored else {
            return Ok(None);
        };
        match UserId::new(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                warn!(error = %err, "discarding session with malformed member id");
                self.0.purge();
                Ok(None)
            }
        }
    }

    /// The signed-in member; anonymous callers get `401`.
    pub fn member(&self) -> Result<UserId, Error> {
        self.viewer()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for MemberSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self::new) })
    }
}
