//! Driven port for the card payment processor.
//!
//! The processor owns card handling and confirmation. The site creates
//! payment intents for the browser to confirm, then reads them back to decide
//! whether a ticket may be issued.

use async_trait::async_trait;

use crate::domain::{CreatePaymentIntent, PaymentIntent, PaymentIntentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The processor has no intent with the requested id.
        NotFound { message: String } =>
            "payment intent not found: {message}",
        /// The processor refused the request as invalid.
        Rejected { message: String } =>
            "payment request rejected: {message}",
        /// The configured secret key was refused.
        Unauthorized { message: String } =>
            "payment processor refused credentials: {message}",
        /// The processor is throttling requests.
        RateLimited { message: String } =>
            "payment processor rate limited: {message}",
        /// The processor did not answer in time.
        Timeout { message: String } =>
            "payment processor timed out: {message}",
        /// The processor could not be reached or failed internally.
        Unavailable { message: String } =>
            "payment processor unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent the browser can confirm with its client secret.
    async fn create_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Read back the current state of an intent.
    async fn retrieve_intent(
        &self,
        id: &PaymentIntentId,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}
