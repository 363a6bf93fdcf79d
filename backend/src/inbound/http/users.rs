//! Account HTTP handlers: registration and passwordless login.
//!
//! ```text
//! POST /api/v1/auth/register    {"email":"ada@example.com","username":"ada"}
//! POST /api/v1/auth/login-link  {"email":"ada@example.com"}
//! POST /api/v1/auth/verify      {"token":"…"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/me
//! ```
//!
//! Login links are always acknowledged with `202` so the endpoint does not
//! reveal which addresses are registered.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, NewUser, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::session::MemberSession;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require, user_error};

/// Registration form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    #[schema(example = "ada")]
    pub username: Option<String>,
    #[schema(example = "Ada Lovelace")]
    pub full_name: Option<String>,
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = crate::domain::Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        let email = require(value.email, FieldName::new("email"))?;
        let username = require(value.username, FieldName::new("username"))?;
        NewUser::try_new(&email, &username, value.full_name.as_deref()).map_err(user_error)
    }
}

/// Request a fresh login link by email.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginLinkRequest {
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Token taken from an emailed login link.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginRequest {
    pub token: Option<String>,
}

/// Register a member and email them a login link.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email or username taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let new_user = NewUser::try_from(payload.into_inner())?;
    let user = state.accounts.register(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Email a login link to a registered address.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login-link",
    request_body = LoginLinkRequest,
    responses(
        (status = 202, description = "Link sent if the address is registered"),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "requestLoginLink",
    security([])
)]
#[post("/auth/login-link")]
pub async fn request_login_link(
    state: web::Data<HttpState>,
    payload: web::Json<LoginLinkRequest>,
) -> ApiResult<HttpResponse> {
    let email = require(payload.into_inner().email, FieldName::new("email"))?;
    let email = EmailAddress::new(email).map_err(user_error)?;
    state.accounts.request_login_link(email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Exchange a login token for a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyLoginRequest,
    responses(
        (
            status = 200,
            description = "Logged in",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = UserSchema
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid or expired token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "verifyLogin",
    security([])
)]
#[post("/auth/verify")]
pub async fn verify_login(
    state: web::Data<HttpState>,
    session: MemberSession,
    payload: web::Json<VerifyLoginRequest>,
) -> ApiResult<web::Json<User>> {
    let token = require(payload.into_inner().token, FieldName::new("token"))?;
    let user = state.accounts.verify_login(&token).await?;
    session.sign_in(&user.id)?;
    Ok(web::Json(user))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Logged out")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: MemberSession) -> HttpResponse {
    session.sign_out();
    HttpResponse::NoContent().finish()
}

/// The logged-in member.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (
            status = 200,
            description = "Current user",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = UserSchema
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: MemberSession,
) -> ApiResult<HttpResponse> {
    let user_id = session.member()?;
    let user = state.accounts.current_user(user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(user))
}
