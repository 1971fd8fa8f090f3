//! In-memory payment processor for local development and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{PaymentGateway, PaymentGatewayError};
use crate::domain::{CreatePaymentIntent, PaymentIntent, PaymentIntentId, PaymentStatus};

/// [`PaymentGateway`] that keeps intents in process memory.
///
/// With `auto_confirm` set, new intents are created already `succeeded`, so a
/// local checkout can issue tickets without a browser confirmation step.
#[derive(Debug, Default)]
pub struct MemoryPaymentGateway {
    intents: RwLock<BTreeMap<String, PaymentIntent>>,
    auto_confirm: bool,
}

impl MemoryPaymentGateway {
    pub fn new(auto_confirm: bool) -> Self {
        Self {
            intents: RwLock::default(),
            auto_confirm,
        }
    }

    /// Move an existing intent to `status`. Returns `false` when unknown.
    pub fn set_status(&self, id: &PaymentIntentId, status: PaymentStatus) -> bool {
        let Ok(mut intents) = self.intents.write() else {
            return false;
        };
        match intents.get_mut(id.as_ref()) {
            Some(intent) => {
                intent.status = status;
                true
            }
            None => false,
        }
    }

    /// Mark an intent as paid.
    pub fn confirm(&self, id: &PaymentIntentId) -> bool {
        self.set_status(id, PaymentStatus::Succeeded)
    }
}

#[async_trait]
impl PaymentGateway for MemoryPaymentGateway {
    async fn create_intent(
        &self,
        request: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let id = PaymentIntentId::generate();
        let status = if self.auto_confirm {
            PaymentStatus::Succeeded
        } else {
            PaymentStatus::RequiresPaymentMethod
        };
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret_local"),
            id,
            status,
            amount_cents: request.amount.cents(),
            currency: request.currency.as_ref().to_owned(),
            metadata: request.metadata.clone(),
        };
        self.intents
            .write()
            .map_err(|_| PaymentGatewayError::unavailable("in-memory store lock poisoned"))?
            .insert(intent.id.to_string(), intent.clone());
        info!(payment_intent_id = %intent.id, status = intent.status.as_str(), "local intent created");
        Ok(intent)
    }

    async fn retrieve_intent(
        &self,
        id: &PaymentIntentId,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        self.intents
            .read()
            .map_err(|_| PaymentGatewayError::unavailable("in-memory store lock poisoned"))?
            .get(id.as_ref())
            .cloned()
            .ok_or_else(|| PaymentGatewayError::not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Email, PaymentAmount};
    use rstest::rstest;

    fn request() -> CreatePaymentIntent {
        CreatePaymentIntent {
            amount: PaymentAmount::new(2500).expect("amount"),
            currency: Currency::default(),
            receipt_email: Email::new("ada@example.com").expect("email"),
            metadata: BTreeMap::from([("quantity".to_owned(), "1".to_owned())]),
        }
    }

    #[rstest]
    #[case(false, PaymentStatus::RequiresPaymentMethod)]
    #[case(true, PaymentStatus::Succeeded)]
    #[tokio::test]
    async fn created_intents_start_in_configured_status(
        #[case] auto_confirm: bool,
        #[case] expected: PaymentStatus,
    ) {
        let gateway = MemoryPaymentGateway::new(auto_confirm);
        let created = gateway.create_intent(&request()).await.expect("intent");
        assert_eq!(created.status, expected);
        assert!(created.client_secret.starts_with(created.id.as_ref()));

        let fetched = gateway.retrieve_intent(&created.id).await.expect("fetch");
        assert_eq!(fetched, created);
    }

    #[rstest]
    #[tokio::test]
    async fn confirm_marks_intent_succeeded() {
        let gateway = MemoryPaymentGateway::new(false);
        let created = gateway.create_intent(&request()).await.expect("intent");
        assert!(gateway.confirm(&created.id));
        let fetched = gateway.retrieve_intent(&created.id).await.expect("fetch");
        assert_eq!(fetched.status, PaymentStatus::Succeeded);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_intents_are_not_found() {
        let gateway = MemoryPaymentGateway::default();
        let err = gateway
            .retrieve_intent(&PaymentIntentId::generate())
            .await
            .expect_err("missing");
        assert!(matches!(err, PaymentGatewayError::NotFound { .. }));
        assert!(!gateway.confirm(&PaymentIntentId::generate()));
    }
}
