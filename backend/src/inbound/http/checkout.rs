//! Resumable checkout wizard backed by the session cookie.
//!
//! ```text
//! GET    /api/checkout/state?payment_intent=pi_...&redirect_status=succeeded
//! POST   /api/checkout/transition {"type":"selectEvent","eventId":"..."}
//! DELETE /api/checkout/state
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    CheckoutEvent, CheckoutState, ContactDetails, Error, EventId, PaymentIntentId,
    PaymentRedirect, RedirectStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::ContactRequest;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::validation::{field_error, parse_payment_intent_id};

/// Wizard state as exposed to the browser.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStateResponse {
    #[schema(example = "identify")]
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<ContactRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
}

impl From<&CheckoutState> for CheckoutStateResponse {
    fn from(state: &CheckoutState) -> Self {
        Self {
            step: state.step.as_str().to_owned(),
            event_id: state.event_id.map(|id| id.as_uuid().to_string()),
            form: state.form.as_ref().map(|form| ContactRequest {
                name: form.name.to_string(),
                email: form.email.to_string(),
                phone: form.phone.to_string(),
            }),
            attendee_id: state.attendee_id.map(|id| id.to_string()),
            payment_intent_id: state.payment_intent_id.as_ref().map(ToString::to_string),
            ticket_id: state.ticket_id.map(|id| id.to_string()),
        }
    }
}

/// Wizard input, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CheckoutEventRequest {
    #[serde(rename_all = "camelCase")]
    SelectEvent { event_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    Identified { form: ContactRequest, attendee_id: Uuid },
    #[serde(rename_all = "camelCase")]
    PaymentCreated { payment_intent_id: String },
    #[serde(rename_all = "camelCase")]
    TicketIssued { ticket_id: Uuid },
    AddToWallet,
    Reset,
}

impl TryFrom<CheckoutEventRequest> for CheckoutEvent {
    type Error = Error;

    fn try_from(value: CheckoutEventRequest) -> Result<Self, Self::Error> {
        Ok(match value {
            CheckoutEventRequest::SelectEvent { event_id } => CheckoutEvent::SelectEvent {
                event_id: event_id
                    .filter(|raw| !raw.is_empty())
                    .map(|raw| {
                        Uuid::parse_str(&raw).map(EventId::from_uuid).map_err(|_| {
                            field_error("eventId", "invalid_uuid", "eventId must be a valid UUID")
                        })
                    })
                    .transpose()?,
            },
            CheckoutEventRequest::Identified { form, attendee_id } => CheckoutEvent::Identified {
                form: ContactDetails::try_from(form)?,
                attendee_id,
            },
            CheckoutEventRequest::PaymentCreated { payment_intent_id } => {
                CheckoutEvent::PaymentCreated {
                    payment_intent_id: parse_payment_intent_id(&payment_intent_id)?,
                }
            }
            CheckoutEventRequest::TicketIssued { ticket_id } => {
                CheckoutEvent::TicketIssued { ticket_id }
            }
            CheckoutEventRequest::AddToWallet => CheckoutEvent::AddToWallet,
            CheckoutEventRequest::Reset => CheckoutEvent::Reset,
        })
    }
}

/// Parameters the payment processor appends when redirecting back.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CheckoutStateQuery {
    pub payment_intent: Option<String>,
    pub redirect_status: Option<String>,
}

impl CheckoutStateQuery {
    /// The redirect, when both parameters are present and well formed.
    fn redirect(&self) -> Option<PaymentRedirect> {
        let (Some(raw_pi), Some(raw_status)) = (&self.payment_intent, &self.redirect_status)
        else {
            return None;
        };
        let payment_intent_id = PaymentIntentId::new(raw_pi).ok();
        let status = RedirectStatus::parse(raw_status);
        match (payment_intent_id, status) {
            (Some(payment_intent_id), Some(status)) => Some(PaymentRedirect {
                payment_intent_id,
                status,
            }),
            _ => {
                warn!(
                    redirect_status = raw_status.as_str(),
                    "ignoring malformed payment redirect"
                );
                None
            }
        }
    }
}

/// Load the wizard state, folding in a payment redirect when present.
#[utoipa::path(
    get,
    path = "/api/checkout/state",
    params(CheckoutStateQuery),
    responses((status = 200, description = "Wizard state", body = CheckoutStateResponse)),
    tags = ["checkout"],
    operation_id = "getCheckoutState",
    security([])
)]
#[get("/checkout/state")]
pub async fn get_checkout_state(
    session: SessionContext,
    query: web::Query<CheckoutStateQuery>,
) -> ApiResult<web::Json<CheckoutStateResponse>> {
    let redirect = query.redirect();
    let had_redirect = redirect.is_some();
    let state = CheckoutState::restore(session.checkout_state(), redirect);
    if had_redirect {
        debug!(step = state.step.as_str(), "checkout resumed from payment redirect");
    }
    session.persist_checkout(&state)?;
    Ok(web::Json(CheckoutStateResponse::from(&state)))
}

/// Advance the wizard.
#[utoipa::path(
    post,
    path = "/api/checkout/transition",
    request_body = CheckoutEventRequest,
    responses(
        (status = 200, description = "Next wizard state", body = CheckoutStateResponse),
        (status = 400, description = "Invalid event payload", body = Error),
        (status = 409, description = "Event not allowed at the current step", body = Error)
    ),
    tags = ["checkout"],
    operation_id = "advanceCheckout",
    security([])
)]
#[post("/checkout/transition")]
pub async fn advance_checkout(
    session: SessionContext,
    payload: web::Json<CheckoutEventRequest>,
) -> ApiResult<web::Json<CheckoutStateResponse>> {
    let event = CheckoutEvent::try_from(payload.into_inner())?;
    let current = session.checkout_state().unwrap_or_default();
    let next = current.apply(event)?;
    session.persist_checkout(&next)?;
    Ok(web::Json(CheckoutStateResponse::from(&next)))
}

/// Forget the wizard state.
#[utoipa::path(
    delete,
    path = "/api/checkout/state",
    responses((status = 204, description = "Cleared")),
    tags = ["checkout"],
    operation_id = "clearCheckoutState",
    security([])
)]
#[delete("/checkout/state")]
pub async fn clear_checkout_state(session: SessionContext) -> HttpResponse {
    session.clear_checkout();
    HttpResponse::NoContent().finish()
}
