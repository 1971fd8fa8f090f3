//! DTOs for decoding payment-processor JSON responses.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{PaymentIntent, PaymentIntentId, PaymentStatus};

#[derive(Debug, Deserialize)]
pub(super) struct PaymentIntentDto {
    pub(super) id: String,
    #[serde(default)]
    pub(super) client_secret: Option<String>,
    pub(super) status: PaymentStatus,
    pub(super) amount: u64,
    pub(super) currency: String,
    #[serde(default)]
    pub(super) metadata: BTreeMap<String, String>,
}

impl PaymentIntentDto {
    pub(super) fn into_domain(self) -> Result<PaymentIntent, String> {
        let id = PaymentIntentId::new(&self.id)
            .map_err(|err| format!("payment intent id {}: {err}", self.id))?;
        Ok(PaymentIntent {
            id,
            client_secret: self.client_secret.unwrap_or_default(),
            status: self.status,
            amount_cents: self.amount,
            currency: self.currency,
            metadata: self.metadata,
        })
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorDetailDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetailDto {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) code: Option<String>,
}
