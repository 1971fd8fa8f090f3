//! Passwordless sign-in handlers.
//!
//! ```text
//! POST /api/auth/otp {"email":"host@example.com"}
//! POST /api/auth/verify {"email":"host@example.com","token":"123456"}
//! GET  /api/auth/session
//! POST /api/auth/logout
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, OtpCode, OtpTarget};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{SessionUserResponse, SuccessResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::otp_error;

/// Where to send the passcode; exactly one of `email` or `phone`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl TryFrom<&OtpRequest> for OtpTarget {
    type Error = Error;

    fn try_from(value: &OtpRequest) -> Result<Self, Self::Error> {
        OtpTarget::try_from_parts(value.email.as_deref(), value.phone.as_deref())
            .map_err(otp_error)
    }
}

/// Passcode verification body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(flatten)]
    pub target: OtpRequest,
    #[serde(default)]
    pub token: String,
}

/// Current session as seen by the browser.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserResponse>,
}

/// Send a one-time passcode.
#[utoipa::path(
    post,
    path = "/api/auth/otp",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Passcode sent", body = SuccessResponse),
        (status = 400, description = "Missing or invalid target", body = Error),
        (status = 503, description = "Auth provider unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestOtp",
    security([])
)]
#[post("/auth/otp")]
pub async fn request_otp(
    state: web::Data<HttpState>,
    payload: web::Json<OtpRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let target = OtpTarget::try_from(&payload.into_inner())?;
    state.login.request_otp(target).await?;
    Ok(web::Json(SuccessResponse::ok("Check your inbox for a sign-in code")))
}

/// Verify a passcode and start a session.
#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid target or token", body = Error),
        (status = 401, description = "Wrong or expired token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "verifyOtp",
    security([])
)]
#[post("/auth/verify")]
pub async fn verify_otp(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let payload = payload.into_inner();
    let target = OtpTarget::try_from(&payload.target)?;
    let code = OtpCode::new(&payload.token).map_err(otp_error)?;
    let user = state.login.verify_otp(target, code).await?;
    session.persist_user(&user)?;
    info!(user_id = %user.id, admin = user.is_admin(), "user signed in");
    Ok(web::Json(SessionResponse {
        user: Some(SessionUserResponse::from(&user)),
    }))
}

/// The signed-in user, if any.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses((status = 200, description = "Current session", body = SessionResponse)),
    tags = ["auth"],
    operation_id = "currentSession",
    security([])
)]
#[get("/auth/session")]
pub async fn current_session(session: SessionContext) -> web::Json<SessionResponse> {
    web::Json(SessionResponse {
        user: session.user().as_ref().map(SessionUserResponse::from),
    })
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.logout();
    HttpResponse::NoContent().finish()
}
