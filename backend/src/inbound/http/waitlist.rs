//! Waitlist signup handler.
//!
//! ```text
//! POST /api/join-waitlist {"name":"Ada","email":"ada@example.com","phone":"4155550100"}
//! ```

use actix_web::{post, web};
use tracing::info;

use crate::domain::{ContactDetails, Error, WAITLIST_JOINED_MESSAGE};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{ContactRequest, SuccessResponse};
use crate::inbound::http::state::HttpState;

/// Add the visitor to the launch waitlist.
#[utoipa::path(
    post,
    path = "/api/join-waitlist",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Joined the waitlist", body = SuccessResponse),
        (status = 400, description = "Invalid contact details", body = Error),
        (status = 409, description = "Already registered or contact conflict", body = Error),
        (status = 503, description = "Waitlist store unavailable", body = Error)
    ),
    tags = ["waitlist"],
    operation_id = "joinWaitlist",
    security([])
)]
#[post("/join-waitlist")]
pub async fn join_waitlist(
    state: web::Data<HttpState>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<SuccessResponse>> {
    let details = ContactDetails::try_from(payload.into_inner())?;
    let entry = state.waitlist.join(details).await?;
    info!(entry_id = %entry.id, "waitlist signup stored");
    Ok(web::Json(SuccessResponse::ok(WAITLIST_JOINED_MESSAGE)))
}
