//! Payment intent creation for the pay step.
//!
//! ```text
//! POST /api/create-payment-intent {"amount":2500,"formData":{"name":"Ada",...}}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CheckoutForm, ContactDetails, Error, Quantity};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::ContactRequest;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_event_id, payment_error};

/// Checkout form fields sent alongside the amount.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutFormRequest {
    #[serde(flatten)]
    pub contact: ContactRequest,
    pub event_id: Option<String>,
    /// Number of tickets; defaults to 1.
    pub quantity: Option<u8>,
}

impl TryFrom<CheckoutFormRequest> for CheckoutForm {
    type Error = Error;

    fn try_from(value: CheckoutFormRequest) -> Result<Self, Self::Error> {
        let contact = ContactDetails::try_from(value.contact)?;
        let event_id = value
            .event_id
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_event_id(&raw))
            .transpose()
            .map_err(|_| field_error("eventId", "invalid_uuid", "eventId must be a valid UUID"))?;
        let quantity = value
            .quantity
            .map(Quantity::new)
            .transpose()
            .map_err(payment_error)?
            .unwrap_or_default();
        Ok(Self {
            contact,
            event_id,
            quantity,
        })
    }
}

/// Request body for `POST /api/create-payment-intent`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Total in minor currency units.
    #[schema(example = 2500)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub form_data: CheckoutFormRequest,
}

/// Client secret the browser uses to confirm the card payment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Create a payment intent for the ticket purchase.
#[utoipa::path(
    post,
    path = "/api/create-payment-intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = CreatePaymentIntentResponse),
        (status = 400, description = "Invalid form, amount or event price mismatch", body = Error),
        (status = 404, description = "Event not found", body = Error),
        (status = 503, description = "Payment processor unavailable", body = Error)
    ),
    tags = ["checkout"],
    operation_id = "createPaymentIntent",
    security([])
)]
#[post("/create-payment-intent")]
pub async fn create_payment_intent(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePaymentIntentRequest>,
) -> ApiResult<web::Json<CreatePaymentIntentResponse>> {
    let CreatePaymentIntentRequest { amount, form_data } = payload.into_inner();
    let amount = amount.ok_or_else(|| {
        field_error("amount", "missing_field", "missing required field: amount")
    })?;
    let form = CheckoutForm::try_from(form_data)?;
    let created = state.payments.create_intent(amount, form).await?;
    Ok(web::Json(CreatePaymentIntentResponse {
        client_secret: created.client_secret,
        payment_intent_id: created.payment_intent_id.to_string(),
    }))
}
