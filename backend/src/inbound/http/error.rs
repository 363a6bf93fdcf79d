//! Actix response rendering for [`domain::Error`](crate::domain::Error).
//!
//! The status follows the error code. Error bodies are never cached. Internal
//! failures are logged with their trace id and reach clients as a generic
//! message, apart from the cron configuration error that operators act on.

use std::borrow::Cow;

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message for cron calls made while no cron secret is configured.
pub const SERVER_CONFIGURATION_ERROR: &str = "Server configuration error";

/// Client-facing text for every other internal error.
pub(crate) const REDACTED_MESSAGE: &str = "Internal server error";

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        // Results before covering, admin routes, covers without a signup.
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        // Phase-gated actions and duplicate slugs, emails or submissions.
        ErrorCode::Conflict => StatusCode::CONFLICT,
        // Fixture ports and unreachable repositories.
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The error as a client may see it.
fn client_view(error: &Error) -> Cow<'_, Error> {
    let exposed = error.code() != ErrorCode::InternalError
        || error.message() == SERVER_CONFIGURATION_ERROR;
    if exposed {
        return Cow::Borrowed(error);
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    Cow::Owned(match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    })
}

fn log_failure(err: &Error) {
    match err.code() {
        ErrorCode::InternalError => {
            error!(trace_id = ?err.trace_id(), message = err.message(), "request failed");
        }
        ErrorCode::ServiceUnavailable => {
            warn!(trace_id = ?err.trace_id(), message = err.message(), "backend unavailable");
        }
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_failure(self);
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(CacheControl(vec![CacheDirective::NoStore]));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_view(self).as_ref())
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced in a handler");
        Self::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
