//! Reqwest-backed payment gateway for the processor's payment-intent API.
//!
//! This adapter owns transport details only: form encoding, bearer auth,
//! timeout and HTTP error mapping, and JSON decoding into domain intents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tracing::warn;
use zeroize::Zeroizing;

use super::dto::{ErrorEnvelopeDto, PaymentIntentDto};
use crate::domain::ports::{PaymentGateway, PaymentGatewayError};
use crate::domain::{CreatePaymentIntent, PaymentIntent, PaymentIntentId};
use crate::outbound::http::{RemoteError, body_preview, map_status_error, map_transport_error};

/// Production API origin.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/";

/// Connection settings for the payment processor.
#[derive(Clone)]
pub struct StripeSettings {
    pub api_base: Url,
    pub secret_key: Zeroizing<String>,
    pub timeout: Duration,
}

/// [`PaymentGateway`] over `/v1/payment_intents`.
pub struct StripeGateway {
    client: Client,
    api_base: Url,
    secret_key: Zeroizing<String>,
}

impl StripeGateway {
    /// Build a gateway using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: StripeSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_base: settings.api_base,
            secret_key: settings.secret_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentGatewayError> {
        self.api_base
            .join(path)
            .map_err(|err| PaymentGatewayError::rejected(format!("invalid endpoint: {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<PaymentIntent, PaymentGatewayError> {
        let response = request
            .bearer_auth(self.secret_key.as_str())
            .send()
            .await
            .map_err(|err| map_remote_error(map_transport_error(err)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| map_remote_error(map_transport_error(err)))?;
        if !status.is_success() {
            let error = map_remote_error(map_status_error(status, &processor_message(&body)));
            warn!(status = status.as_u16(), error = %error, "payment processor request failed");
            return Err(error);
        }
        parse_intent(&body)
    }
}

/// Prefer the processor's own error message over the raw body.
fn processor_message(body: &[u8]) -> Vec<u8> {
    match serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        Ok(envelope) => {
            let message = envelope.error.message.unwrap_or_default();
            match envelope.error.code {
                Some(code) => format!("{code}: {message}").into_bytes(),
                None => message.into_bytes(),
            }
        }
        Err(_) => body_preview(body).into_bytes(),
    }
}

fn parse_intent(body: &[u8]) -> Result<PaymentIntent, PaymentGatewayError> {
    let decoded: PaymentIntentDto = serde_json::from_slice(body).map_err(|err| {
        PaymentGatewayError::unavailable(format!("invalid payment intent payload: {err}"))
    })?;
    decoded
        .into_domain()
        .map_err(PaymentGatewayError::unavailable)
}

fn map_remote_error(error: RemoteError) -> PaymentGatewayError {
    match error {
        RemoteError::NotFound { message } => PaymentGatewayError::not_found(message),
        RemoteError::Unauthorized { message } => PaymentGatewayError::unauthorized(message),
        RemoteError::RateLimited { message } => PaymentGatewayError::rate_limited(message),
        RemoteError::Timeout { message } => PaymentGatewayError::timeout(message),
        RemoteError::Rejected { message } | RemoteError::Conflict { message } => {
            PaymentGatewayError::rejected(message)
        }
        RemoteError::Unavailable { message } | RemoteError::Decode { message } => {
            PaymentGatewayError::unavailable(message)
        }
    }
}

fn intent_form(request: &CreatePaymentIntent) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_owned(), request.amount.cents().to_string()),
        ("currency".to_owned(), request.currency.as_ref().to_owned()),
        ("receipt_email".to_owned(), request.receipt_email.to_string()),
        (
            "automatic_payment_methods[enabled]".to_owned(),
            "true".to_owned(),
        ),
    ];
    form.extend(
        request
            .metadata
            .iter()
            .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
    );
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let url = self.endpoint("v1/payment_intents")?;
        self.send(self.client.post(url).form(&intent_form(request)))
            .await
    }

    async fn retrieve_intent(
        &self,
        id: &PaymentIntentId,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let url = self.endpoint(&format!("v1/payment_intents/{id}"))?;
        self.send(self.client.get(url)).await
    }
}
