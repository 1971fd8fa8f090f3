//! Driving port for ticket issuance and door check-in.

use async_trait::async_trait;

use crate::domain::{Error, IssuedTicket, PaymentIntentId, SessionUser, TicketView};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// Issue the ticket paid for by a succeeded payment intent.
    ///
    /// Repeated calls for the same intent return the existing ticket.
    async fn issue(&self, payment_intent_id: PaymentIntentId) -> Result<IssuedTicket, Error>;

    /// Flip the check-in flag. Only admins may call this.
    async fn toggle_check_in(
        &self,
        actor: Option<SessionUser>,
        payment_intent_id: PaymentIntentId,
    ) -> Result<TicketView, Error>;
}
