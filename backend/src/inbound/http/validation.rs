//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every failure becomes an `invalid_request` error whose `details` carry the
//! offending wire field and a stable code, e.g.
//! `{"field": "youtubeLink", "code": "invalid_value"}`.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::round::{MilestoneOrderError, RoundSlug, SongValidationError};
use crate::domain::voting::BallotError;
use crate::domain::{Error, ParticipationValidationError, UserId, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidValue,
    InvalidSlug,
    InvalidUuid,
    InvalidTimestamp,
    MilestoneOrder,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidSlug => "invalid_slug",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::MilestoneOrder => "invalid_milestones",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

/// Unwrap a required JSON field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_slug(value: String) -> Result<RoundSlug, Error> {
    RoundSlug::new(value.as_str()).map_err(|err| {
        ValidationError::new("slug", err.to_string()).with_value(ErrorCode::InvalidSlug, value)
    })
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    let field = field.as_str();
    UserId::new(value).map_err(|_| {
        ValidationError::new(field, format!("{field} must be a valid UUID"))
            .with_value(ErrorCode::InvalidUuid, value)
    })
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn participation_error(err: ParticipationValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn song_error(err: SongValidationError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn ballot_error(err: BallotError) -> Error {
    ValidationError::new("votes", err.to_string()).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn milestone_error(err: MilestoneOrderError) -> Error {
    ValidationError::new(err.field(), err.to_string()).with_code(ErrorCode::MilestoneOrder)
}

pub(crate) fn user_error(err: UserValidationError) -> Error {
    let field = match err {
        UserValidationError::InvalidId => "id",
        UserValidationError::EmptyEmail | UserValidationError::InvalidEmail => "email",
        UserValidationError::UsernameLength { .. }
        | UserValidationError::UsernameInvalidCharacters => "username",
        UserValidationError::FullNameTooLong { .. } => "fullName",
    };
    ValidationError::new(field, err.to_string()).with_code(ErrorCode::InvalidValue)
}
