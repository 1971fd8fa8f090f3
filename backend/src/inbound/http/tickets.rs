//! Ticket issuance, lookup and door scanning.
//!
//! ```text
//! POST /api/tickets {"paymentIntentId":"pi_..."}
//! GET  /api/tickets/{paymentIntentId}
//! GET  /api/tickets/{id}/wallet-pass
//! GET  /api/admin/scan/{paymentIntentId}
//! POST /api/admin/scan/{paymentIntentId}/toggle
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, TicketView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_payment_intent_id};

/// Ticket as returned to the buyer and to door staff.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub payment_intent_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub quantity: u8,
    pub amount_cents: u64,
    pub checked_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Link encoded in the ticket's QR code.
    pub qr_url: String,
}

impl From<TicketView> for TicketResponse {
    fn from(view: TicketView) -> Self {
        let TicketView { ticket, qr_url } = view;
        Self {
            id: ticket.id.to_string(),
            payment_intent_id: ticket.payment_intent_id.to_string(),
            name: ticket.name.to_string(),
            email: ticket.email.to_string(),
            phone: ticket.phone.to_string(),
            event_id: ticket.event_id.map(|id| id.to_string()),
            quantity: ticket.quantity.get(),
            amount_cents: ticket.amount_cents,
            checked_in: ticket.checked_in,
            checked_in_at: ticket.checked_in_at,
            created_at: ticket.created_at,
            qr_url: qr_url.to_string(),
        }
    }
}

/// Request body for `POST /api/tickets`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketRequest {
    pub payment_intent_id: Option<String>,
}

/// Issued ticket plus whether this call created it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueTicketResponse {
    pub ticket: TicketResponse,
    pub created: bool,
}

/// Issue the ticket for a succeeded payment intent.
///
/// Repeating the call for the same intent returns the stored ticket with
/// `200` instead of `201`.
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = IssueTicketRequest,
    responses(
        (status = 201, description = "Ticket issued", body = IssueTicketResponse),
        (status = 200, description = "Ticket already issued for this intent", body = IssueTicketResponse),
        (status = 400, description = "Malformed payment intent id", body = Error),
        (status = 402, description = "Payment has not succeeded", body = Error),
        (status = 404, description = "Unknown payment intent", body = Error),
        (status = 503, description = "Payment processor or ticket store unavailable", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "issueTicket",
    security([])
)]
#[post("/tickets")]
pub async fn issue_ticket(
    state: web::Data<HttpState>,
    payload: web::Json<IssueTicketRequest>,
) -> ApiResult<HttpResponse> {
    let raw = payload.into_inner().payment_intent_id.ok_or_else(|| {
        field_error(
            "paymentIntentId",
            "missing_field",
            "missing required field: paymentIntentId",
        )
    })?;
    let payment_intent_id = parse_payment_intent_id(&raw)?;
    let issued = state.tickets.issue(payment_intent_id).await?;
    let mut response = if issued.created {
        info!(ticket_id = %issued.view.ticket.id, "ticket issued");
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(IssueTicketResponse {
        ticket: TicketResponse::from(issued.view),
        created: issued.created,
    }))
}

/// Fetch the ticket paid for by a payment intent.
#[utoipa::path(
    get,
    path = "/api/tickets/{payment_intent_id}",
    params(("payment_intent_id" = String, Path, description = "Payment intent id")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 400, description = "Malformed payment intent id", body = Error),
        (status = 404, description = "No ticket for this intent", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "getTicket",
    security([])
)]
#[get("/tickets/{payment_intent_id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketResponse>> {
    let payment_intent_id = parse_payment_intent_id(&path.into_inner())?;
    let view = state.tickets_query.find(payment_intent_id).await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Wallet passes are not generated yet.
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/wallet-pass",
    params(("id" = String, Path, description = "Ticket id")),
    responses((status = 501, description = "Wallet passes are not available", body = Error)),
    tags = ["tickets"],
    operation_id = "getWalletPass",
    security([])
)]
#[get("/tickets/{id}/wallet-pass")]
pub async fn wallet_pass(path: web::Path<String>) -> ApiResult<HttpResponse> {
    let _ticket_id = path.into_inner();
    Err(Error::not_implemented("wallet passes are not available yet"))
}

/// Door scanner lookup.
#[utoipa::path(
    get,
    path = "/api/admin/scan/{payment_intent_id}",
    params(("payment_intent_id" = String, Path, description = "Payment intent id from the QR code")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No ticket for this intent", body = Error)
    ),
    tags = ["admin"],
    operation_id = "scanTicket"
)]
#[get("/admin/scan/{payment_intent_id}")]
pub async fn scan_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketResponse>> {
    let payment_intent_id = parse_payment_intent_id(&path.into_inner())?;
    let view = state
        .tickets_query
        .scan(session.user(), payment_intent_id)
        .await?;
    Ok(web::Json(TicketResponse::from(view)))
}

/// Flip a ticket's check-in flag.
#[utoipa::path(
    post,
    path = "/api/admin/scan/{payment_intent_id}/toggle",
    params(("payment_intent_id" = String, Path, description = "Payment intent id from the QR code")),
    responses(
        (status = 200, description = "Updated ticket", body = TicketResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "No ticket for this intent", body = Error)
    ),
    tags = ["admin"],
    operation_id = "toggleCheckIn"
)]
#[post("/admin/scan/{payment_intent_id}/toggle")]
pub async fn toggle_check_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketResponse>> {
    let payment_intent_id = parse_payment_intent_id(&path.into_inner())?;
    let view = state
        .tickets
        .toggle_check_in(session.user(), payment_intent_id)
        .await?;
    info!(
        payment_intent_id = %view.ticket.payment_intent_id,
        checked_in = view.ticket.checked_in,
        "check-in toggled"
    );
    Ok(web::Json(TicketResponse::from(view)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Email, IssuedTicket, PaymentIntentId, PersonName, PhoneNumber, Quantity, Ticket, scan_url,
    };
    use crate::inbound::http::test_utils::{MockPorts, call_json};
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;
    use url::Url;
    use uuid::Uuid;

    const PI: &str = "pi_3MtwBwLkdIwHu7ix";

    fn view() -> TicketView {
        let payment_intent_id = PaymentIntentId::new(PI).expect("pi");
        let base = Url::parse("https://events.example.com/").expect("url");
        TicketView {
            qr_url: scan_url(&base, &payment_intent_id),
            ticket: Ticket {
                id: Uuid::nil(),
                payment_intent_id,
                name: PersonName::new("Ada").expect("name"),
                email: Email::new("ada@example.com").expect("email"),
                phone: PhoneNumber::new("4155550100").expect("phone"),
                event_id: None,
                quantity: Quantity::default(),
                amount_cents: 2500,
                checked_in: false,
                checked_in_at: None,
                created_at: Utc::now(),
            },
        }
    }

    #[rstest]
    #[case(true, StatusCode::CREATED)]
    #[case(false, StatusCode::OK)]
    #[actix_web::test]
    async fn issue_status_reflects_creation(#[case] created: bool, #[case] status: StatusCode) {
        let mut ports = MockPorts::default();
        ports
            .tickets
            .expect_issue()
            .withf(|pi| pi.as_ref() == PI)
            .returning(move |_| {
                Ok(IssuedTicket {
                    view: view(),
                    created,
                })
            });

        let (actual, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/tickets")
                .set_json(json!({"paymentIntentId": PI})),
        )
        .await;
        assert_eq!(actual, status);
        assert_eq!(body["created"], created);
        assert_eq!(
            body["ticket"]["qrUrl"],
            format!("https://events.example.com/admin/scan?pi={PI}")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn unpaid_intents_are_payment_required() {
        let mut ports = MockPorts::default();
        ports.tickets.expect_issue().returning(|_| {
            Err(Error::payment_required("payment has not succeeded")
                .with_details(json!({"status": "processing"})))
        });

        let (status, body) = call_json(
            ports,
            TestRequest::post()
                .uri("/api/tickets")
                .set_json(json!({"paymentIntentId": PI})),
        )
        .await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body["details"]["status"], "processing");
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_intent_ids_never_reach_the_service() {
        let (status, body) = call_json(
            MockPorts::default(),
            TestRequest::get().uri("/api/tickets/not-an-intent"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "paymentIntentId");
    }

    #[rstest]
    #[actix_web::test]
    async fn wallet_pass_is_not_implemented() {
        let (status, body) = call_json(
            MockPorts::default(),
            TestRequest::get().uri("/api/tickets/abc/wallet-pass"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["code"], "not_implemented");
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_scan_passes_no_actor() {
        let mut ports = MockPorts::default();
        ports
            .tickets_query
            .expect_scan()
            .withf(|actor, _| actor.is_none())
            .returning(|_, _| Err(Error::unauthorized("sign in required")));

        let (status, _) = call_json(
            ports,
            TestRequest::get().uri(&format!("/api/admin/scan/{PI}")),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
