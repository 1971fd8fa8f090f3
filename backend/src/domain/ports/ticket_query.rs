//! Driving port for reading issued tickets.

use async_trait::async_trait;

use crate::domain::{Error, PaymentIntentId, SessionUser, TicketView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Fetch the ticket for a payment intent, or `404`.
    async fn find(&self, payment_intent_id: PaymentIntentId) -> Result<TicketView, Error>;

    /// Fetch a ticket for the door scanner. Only admins may call this.
    async fn scan(
        &self,
        actor: Option<SessionUser>,
        payment_intent_id: PaymentIntentId,
    ) -> Result<TicketView, Error>;
}
