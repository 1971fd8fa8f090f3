//! Driving port for starting a card payment.
//!
//! Inbound adapters hand over the raw amount and the validated checkout form;
//! the service checks the amount against the event price before talking to
//! the processor.

use async_trait::async_trait;

use crate::domain::{CheckoutForm, CreatedPaymentIntent, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentCommand: Send + Sync {
    /// Create a payment intent for `amount_cents` minor units.
    async fn create_intent(
        &self,
        amount_cents: u64,
        form: CheckoutForm,
    ) -> Result<CreatedPaymentIntent, Error>;
}
