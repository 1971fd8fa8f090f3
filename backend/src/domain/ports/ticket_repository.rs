//! Driven port for ticket persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{PaymentIntentId, Ticket};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ticket repository adapters.
    pub enum TicketRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "ticket repository connection failed: {message}",
        /// The store rejected or failed the request.
        Query { message: String } =>
            "ticket repository query failed: {message}",
        /// A ticket already exists for the payment intent.
        Duplicate { message: String } =>
            "ticket already exists: {message}",
    }
}

/// Storage for tickets keyed by payment intent.
///
/// At most one ticket exists per payment intent. Adapters report a second
/// insert for the same intent as [`TicketRepositoryError::Duplicate`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Fetch the ticket paid for by `payment_intent_id`.
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Store a newly issued ticket.
    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError>;

    /// Set the check-in state. `None` clears it.
    ///
    /// Returns the updated ticket, or `None` when no ticket matches.
    async fn update_check_in(
        &self,
        payment_intent_id: &PaymentIntentId,
        checked_in_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;
}
