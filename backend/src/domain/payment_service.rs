//! Payment-intent creation for ticket checkout.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::ports::{
    EventRepository, EventRepositoryError, PaymentCommand, PaymentGateway, PaymentGatewayError,
};
use super::{
    CheckoutForm, CreatePaymentIntent, CreatedPaymentIntent, Currency, Error, PaymentAmount,
};

/// Payment service implementing [`PaymentCommand`].
#[derive(Clone)]
pub struct PaymentService<E: ?Sized, G: ?Sized> {
    events: Arc<E>,
    gateway: Arc<G>,
    currency: Currency,
}

impl<E: ?Sized, G: ?Sized> PaymentService<E, G> {
    /// Create a service charging in `currency`.
    pub fn new(events: Arc<E>, gateway: Arc<G>, currency: Currency) -> Self {
        Self {
            events,
            gateway,
            currency,
        }
    }
}

/// Translate processor failures into API errors.
pub(crate) fn map_gateway_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::NotFound { .. } => Error::not_found("payment intent not found"),
        PaymentGatewayError::Rejected { message } => {
            Error::invalid_request(format!("payment request rejected: {message}"))
                .with_details(json!({ "code": "payment_rejected" }))
        }
        PaymentGatewayError::Unauthorized { message } => {
            Error::internal(format!("payment processor credentials rejected: {message}"))
        }
        PaymentGatewayError::RateLimited { .. } => {
            Error::service_unavailable("payment processor is busy, try again shortly")
        }
        PaymentGatewayError::Timeout { .. } | PaymentGatewayError::Unavailable { .. } => {
            Error::service_unavailable("payment processor unavailable")
        }
    }
}

pub(crate) fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
    }
}

fn invalid_amount(code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": "amount", "code": code }))
}

impl<E: ?Sized, G: ?Sized> PaymentService<E, G>
where
    E: EventRepository,
{
    async fn check_event_price(
        &self,
        amount: PaymentAmount,
        form: &CheckoutForm,
    ) -> Result<(), Error> {
        let Some(event_id) = form.event_id else {
            return Ok(());
        };
        let event = self
            .events
            .find_by_id(&event_id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found(format!("event {event_id} not found")))?;
        if event.price_cents == 0 {
            return Err(invalid_amount("free_event", "this event does not take payment"));
        }
        let expected = event
            .price_cents
            .checked_mul(u64::from(form.quantity.get()))
            .ok_or_else(|| {
                invalid_amount("amount_mismatch", "event price exceeds the payable range")
            })?;
        if amount.cents() != expected {
            return Err(Error::invalid_request(format!(
                "amount must be {expected} for this event"
            ))
            .with_details(json!({
                "field": "amount",
                "code": "amount_mismatch",
                "expected": expected,
            })));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: ?Sized, G: ?Sized> PaymentCommand for PaymentService<E, G>
where
    E: EventRepository,
    G: PaymentGateway,
{
    async fn create_intent(
        &self,
        amount_cents: u64,
        form: CheckoutForm,
    ) -> Result<CreatedPaymentIntent, Error> {
        let amount = PaymentAmount::new(amount_cents)
            .map_err(|err| invalid_amount("amount_out_of_range", err.to_string()))?;
        self.check_event_price(amount, &form).await?;

        let request = CreatePaymentIntent {
            amount,
            currency: self.currency.clone(),
            receipt_email: form.contact.email.clone(),
            metadata: form.to_metadata(),
        };
        let intent = self
            .gateway
            .create_intent(&request)
            .await
            .map_err(|err| {
                warn!(error = %err, "payment intent creation failed");
                map_gateway_error(err)
            })?;
        info!(
            payment_intent_id = %intent.id,
            amount_cents = amount.cents(),
            "payment intent created"
        );
        Ok(CreatedPaymentIntent {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockEventRepository, MockPaymentGateway};
    use crate::domain::test_clock::fixture_timestamp;
    use crate::domain::{
        ContactDetails, ErrorCode, Event, EventId, PaymentIntent, PaymentIntentId, PaymentStatus,
        Quantity,
    };
    use rstest::{fixture, rstest};

    fn form(event_id: Option<EventId>, quantity: u8) -> CheckoutForm {
        CheckoutForm {
            contact: ContactDetails::try_from_parts("Ada", "ada@example.com", "4155550100")
                .expect("contact"),
            event_id,
            quantity: Quantity::new(quantity).expect("quantity"),
        }
    }

    fn event(id: EventId, price_cents: u64) -> Event {
        Event {
            id,
            title: "Mixer".into(),
            description: String::new(),
            location: "Austin".into(),
            starts_at: fixture_timestamp(),
            ends_at: None,
            price_cents,
            capacity: None,
            image_url: None,
            created_by: None,
            created_at: fixture_timestamp(),
        }
    }

    fn intent(request: &CreatePaymentIntent) -> PaymentIntent {
        PaymentIntent {
            id: PaymentIntentId::new("pi_test000000001").expect("id"),
            client_secret: "pi_test000000001_secret_abc".into(),
            status: PaymentStatus::RequiresPaymentMethod,
            amount_cents: request.amount.cents(),
            currency: request.currency.as_ref().to_owned(),
            metadata: request.metadata.clone(),
        }
    }

    #[fixture]
    fn gateway() -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_intent()
            .returning(|request| Ok(intent(request)));
        gateway
    }

    fn service(
        events: MockEventRepository,
        gateway: MockPaymentGateway,
    ) -> PaymentService<MockEventRepository, MockPaymentGateway> {
        PaymentService::new(Arc::new(events), Arc::new(gateway), Currency::default())
    }

    fn detail_code(error: &Error) -> Option<String> {
        error
            .details()
            .and_then(|value| value.get("code"))
            .and_then(|value| value.as_str())
            .map(str::to_owned)
    }

    #[rstest]
    #[tokio::test]
    async fn creates_intent_without_event(gateway: MockPaymentGateway) {
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().never();
        let created = service(events, gateway)
            .create_intent(2500, form(None, 1))
            .await
            .expect("intent");
        assert_eq!(created.payment_intent_id.as_ref(), "pi_test000000001");
        assert!(created.client_secret.contains("_secret_"));
    }

    #[rstest]
    #[tokio::test]
    async fn metadata_carries_checkout_form() {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_intent()
            .withf(|request| {
                request.metadata.get("email").map(String::as_str) == Some("ada@example.com")
                    && request.metadata.get("quantity").map(String::as_str) == Some("1")
                    && request.receipt_email.as_ref() == "ada@example.com"
                    && request.currency.as_ref() == "usd"
            })
            .times(1)
            .returning(|request| Ok(intent(request)));
        let events = MockEventRepository::new();
        service(events, gateway)
            .create_intent(500, form(None, 1))
            .await
            .expect("intent");
    }

    #[rstest]
    #[case(49)]
    #[case(1_000_001)]
    #[tokio::test]
    async fn out_of_range_amounts_are_rejected(#[case] amount: u64) {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_intent().never();
        let err = service(MockEventRepository::new(), gateway)
            .create_intent(amount, form(None, 1))
            .await
            .expect_err("amount out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail_code(&err).as_deref(), Some("amount_out_of_range"));
    }

    #[rstest]
    #[case(1500, 2, 3000, None)]
    #[case(1500, 2, 1500, Some("amount_mismatch"))]
    #[case(0, 1, 500, Some("free_event"))]
    #[case(u64::MAX, 2, 3000, Some("amount_mismatch"))]
    #[tokio::test]
    async fn event_price_is_enforced(
        gateway: MockPaymentGateway,
        #[case] price: u64,
        #[case] quantity: u8,
        #[case] amount: u64,
        #[case] expected_error: Option<&str>,
    ) {
        let id = EventId::random();
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(event(id, price))));
        let result = service(events, gateway)
            .create_intent(amount, form(Some(id), quantity))
            .await;
        match expected_error {
            None => {
                result.expect("intent");
            }
            Some(code) => {
                let err = result.expect_err("price check fails");
                assert_eq!(detail_code(&err).as_deref(), Some(code));
            }
        }
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_event_is_not_found(gateway: MockPaymentGateway) {
        let mut events = MockEventRepository::new();
        events.expect_find_by_id().return_once(|_| Ok(None));
        let err = service(events, gateway)
            .create_intent(1000, form(Some(EventId::random()), 1))
            .await
            .expect_err("missing event");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(PaymentGatewayError::rate_limited("slow down"), ErrorCode::ServiceUnavailable)]
    #[case(PaymentGatewayError::timeout("10s"), ErrorCode::ServiceUnavailable)]
    #[case(PaymentGatewayError::rejected("bad amount"), ErrorCode::InvalidRequest)]
    #[case(PaymentGatewayError::unauthorized("bad key"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn gateway_failures_are_mapped(
        #[case] failure: PaymentGatewayError,
        #[case] expected: ErrorCode,
    ) {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_intent()
            .return_once(move |_| Err(failure));
        let err = service(MockEventRepository::new(), gateway)
            .create_intent(1000, form(None, 1))
            .await
            .expect_err("gateway failure");
        assert_eq!(err.code(), expected);
    }
}
