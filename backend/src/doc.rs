//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every `#[utoipa::path]` handler in the inbound HTTP
//! layer and registers the session cookie security scheme. The document backs
//! Swagger UI in debug builds and is printed by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::attendees::IdentifyResponse;
use crate::inbound::http::auth::{OtpRequest, SessionResponse, VerifyRequest};
use crate::inbound::http::checkout::{CheckoutEventRequest, CheckoutStateResponse};
use crate::inbound::http::dto::{ContactRequest, SessionUserResponse, SuccessResponse};
use crate::inbound::http::events::{EventRequest, EventResponse, EventsListResponse};
use crate::inbound::http::payments::{
    CheckoutFormRequest, CreatePaymentIntentRequest, CreatePaymentIntentResponse,
};
use crate::inbound::http::tickets::{IssueTicketRequest, IssueTicketResponse, TicketResponse};

/// Enrich the generated document with the session cookie security scheme.
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
                "Session cookie issued by POST /api/auth/verify.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Launch site backend API",
        description = "Waitlist, checkout, ticketing, events and door check-in.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::waitlist::join_waitlist,
        crate::inbound::http::attendees::identify_attendee,
        crate::inbound::http::payments::create_payment_intent,
        crate::inbound::http::tickets::issue_ticket,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::wallet_pass,
        crate::inbound::http::tickets::scan_ticket,
        crate::inbound::http::tickets::toggle_check_in,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::get_event,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::auth::request_otp,
        crate::inbound::http::auth::verify_otp,
        crate::inbound::http::auth::current_session,
        crate::inbound::http::auth::logout,
        crate::inbound::http::checkout::get_checkout_state,
        crate::inbound::http::checkout::advance_checkout,
        crate::inbound::http::checkout::clear_checkout_state,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        ContactRequest,
        SuccessResponse,
        SessionUserResponse,
        IdentifyResponse,
        CheckoutFormRequest,
        CreatePaymentIntentRequest,
        CreatePaymentIntentResponse,
        IssueTicketRequest,
        IssueTicketResponse,
        TicketResponse,
        EventRequest,
        EventResponse,
        EventsListResponse,
        OtpRequest,
        VerifyRequest,
        SessionResponse,
        CheckoutEventRequest,
        CheckoutStateResponse,
    )),
    tags(
        (name = "waitlist", description = "Pre-launch signups"),
        (name = "checkout", description = "Ticket purchase wizard"),
        (name = "payments", description = "Card payments"),
        (name = "tickets", description = "Issued tickets"),
        (name = "events", description = "Event listing and management"),
        (name = "admin", description = "Door scanning"),
        (name = "auth", description = "Passwordless sign-in"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
