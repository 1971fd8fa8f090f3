//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes `400 invalid_request` with
//! `details: {"field", "code"}` so clients can highlight the offending input.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    ContactValidationError, Error, EventId, EventValidationError, OtpValidationError,
    PaymentIntentId, PaymentValidationError,
};

pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

pub(crate) fn contact_error(err: ContactValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn event_error(err: EventValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn otp_error(err: OtpValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn payment_error(err: PaymentValidationError) -> Error {
    let (field, code) = match &err {
        PaymentValidationError::AmountOutOfRange { .. } => ("amount", "amount_out_of_range"),
        PaymentValidationError::QuantityOutOfRange { .. } => ("quantity", "invalid_quantity"),
        PaymentValidationError::InvalidCurrency => ("currency", "invalid_currency"),
        PaymentValidationError::InvalidPaymentIntentId => {
            ("paymentIntentId", "invalid_payment_intent_id")
        }
        PaymentValidationError::MissingMetadata { key }
        | PaymentValidationError::InvalidMetadata { key } => (*key, "invalid_metadata"),
    };
    field_error(field, code, err.to_string())
}

/// Parse a payment intent id taken from a path or body.
pub(crate) fn parse_payment_intent_id(raw: &str) -> Result<PaymentIntentId, Error> {
    PaymentIntentId::new(raw).map_err(payment_error)
}

/// Parse an event id taken from a path segment.
pub(crate) fn parse_event_id(raw: &str) -> Result<EventId, Error> {
    Uuid::parse_str(raw)
        .map(EventId::from_uuid)
        .map_err(|_| field_error("id", "invalid_uuid", "id must be a valid UUID"))
}
