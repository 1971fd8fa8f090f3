//! Identify step of the checkout wizard.
//!
//! ```text
//! POST /api/attendees/identify {"name":"Ada","email":"ada@example.com","phone":"4155550100"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ContactDetails, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::ContactRequest;
use crate::inbound::http::state::HttpState;

/// Outcome of identifying an attendee.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyResponse {
    pub success: bool,
    pub message: String,
    pub attendee_id: String,
    /// `true` when the contact details matched a stored attendee.
    pub existing: bool,
}

/// Find or register the attendee buying a ticket.
#[utoipa::path(
    post,
    path = "/api/attendees/identify",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Attendee identified", body = IdentifyResponse),
        (status = 400, description = "Invalid contact details", body = Error),
        (status = 409, description = "Email or phone belongs to another attendee", body = Error),
        (status = 503, description = "Attendee store unavailable", body = Error)
    ),
    tags = ["checkout"],
    operation_id = "identifyAttendee",
    security([])
)]
#[post("/attendees/identify")]
pub async fn identify_attendee(
    state: web::Data<HttpState>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<web::Json<IdentifyResponse>> {
    let details = ContactDetails::try_from(payload.into_inner())?;
    let identification = state.attendees.identify(details).await?;
    let message = if identification.existing {
        "Welcome back!"
    } else {
        "Details saved"
    };
    Ok(web::Json(IdentifyResponse {
        success: true,
        message: message.to_owned(),
        attendee_id: identification.attendee.id.to_string(),
        existing: identification.existing,
    }))
}
