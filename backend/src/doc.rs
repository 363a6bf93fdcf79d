//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`UserSchema`], [`PhaseSchema`]) that describe domain payloads without
//!   coupling domain types to utoipa
//! - **Security**: the session cookie and the cron bearer secret
//!
//! The generated document is served by Swagger UI in debug builds and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, PhaseSchema, UserSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/verify.",
            ))),
        );
        components.add_security_scheme(
            "CronBearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Shared secret configured as EPTSS_CRON_SECRET."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Everyone Plays the Same Song API",
        description = "Quarterly cover rounds: signups, voting, covering and the listening party."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::request_login_link,
        crate::inbound::http::users::verify_login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::rounds::list_rounds,
        crate::inbound::http::rounds::current_round,
        crate::inbound::http::rounds::future_rounds,
        crate::inbound::http::rounds::get_round,
        crate::inbound::http::rounds::voting_options,
        crate::inbound::http::rounds::vote_results,
        crate::inbound::http::participation::sign_up,
        crate::inbound::http::participation::vote,
        crate::inbound::http::participation::submit_cover,
        crate::inbound::http::participation::my_participation,
        crate::inbound::http::admin::create_round,
        crate::inbound::http::admin::update_round,
        crate::inbound::http::admin::set_round_song,
        crate::inbound::http::admin::round_report,
        crate::inbound::http::admin::submit_for_user,
        crate::inbound::http::cron::assign_round_song,
        crate::inbound::http::cron::create_future_rounds,
        crate::inbound::http::cron::send_reminder_emails,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(UserSchema, ErrorSchema, ErrorCodeSchema, PhaseSchema)),
    tags(
        (name = "users", description = "Registration, login links and sessions"),
        (name = "rounds", description = "Public round views"),
        (name = "participation", description = "Signups, votes and submissions"),
        (name = "admin", description = "Round management for admins"),
        (name = "cron", description = "Scheduled jobs"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI registration.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const USER_SCHEMA_NAME: &str = "crate.domain.User";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_user_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let user_schema = schemas.get(USER_SCHEMA_NAME).expect("User schema");

        assert_object_schema_has_field(user_schema, "username");
        assert_object_schema_has_field(user_schema, "adminLevel");
    }

    #[rstest]
    #[case("/api/v1/rounds/{slug}")]
    #[case("/api/v1/rounds/{slug}/votes")]
    #[case("/api/v1/admin/rounds")]
    #[case("/api/v1/cron/send-reminder-emails")]
    #[case("/health/ready")]
    fn openapi_registers_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn openapi_declares_both_security_schemes() {
        let doc = ApiDoc::openapi();
        let schemes = &doc
            .components
            .as_ref()
            .expect("components")
            .security_schemes;
        assert!(schemes.contains_key("SessionCookie"));
        assert!(schemes.contains_key("CronBearer"));
    }
}
