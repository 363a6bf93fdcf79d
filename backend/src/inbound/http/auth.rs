//! Bearer-secret check for the cron endpoints.
//!
//! Keep the cron handlers focused on invoking jobs by concentrating the
//! `Authorization: Bearer <secret>` comparison here.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use tracing::{error, warn};

use crate::domain::{Error, constant_time_eq};

use super::ApiResult;
use super::error::SERVER_CONFIGURATION_ERROR;

const BEARER_PREFIX: &str = "Bearer ";

/// Accept the request only when its bearer token equals `expected`.
///
/// A missing secret is a deployment fault and surfaces as a public
/// `500 Server configuration error`; any other mismatch is `401`.
pub fn require_cron_secret(headers: &HeaderMap, expected: Option<&str>) -> ApiResult<()> {
    let Some(expected) = expected else {
        error!("cron endpoint called but no cron secret is configured");
        return Err(Error::internal(SERVER_CONFIGURATION_ERROR));
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));
    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => {
            warn!("cron request rejected");
            Err(Error::unauthorized("Unauthorized"))
        }
    }
}
