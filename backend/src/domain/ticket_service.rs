//! Ticket issuance, lookup and door check-in.
//!
//! Issuance trusts only the payment processor: the intent must have
//! succeeded, and the ticket fields come from the metadata stored on the
//! intent when it was created.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::payment_service::map_gateway_error;
use super::ports::{
    PaymentGateway, TicketCommand, TicketQuery, TicketRepository, TicketRepositoryError,
};
use super::{
    CheckoutForm, Error, IssuedTicket, PaymentIntent, PaymentIntentId, PaymentStatus,
    SessionUser, Ticket, TicketView, authorize_admin, scan_url,
};

/// Ticket service implementing [`TicketCommand`] and [`TicketQuery`].
#[derive(Clone)]
pub struct TicketService<T: ?Sized, G: ?Sized> {
    tickets: Arc<T>,
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    public_base_url: Url,
}

impl<T: ?Sized, G: ?Sized> TicketService<T, G> {
    /// Create a service whose QR links point at `public_base_url`.
    pub fn new(
        tickets: Arc<T>,
        gateway: Arc<G>,
        clock: Arc<dyn Clock>,
        public_base_url: Url,
    ) -> Self {
        Self {
            tickets,
            gateway,
            clock,
            public_base_url,
        }
    }

    fn view(&self, ticket: Ticket) -> TicketView {
        let qr_url = scan_url(&self.public_base_url, &ticket.payment_intent_id);
        TicketView { ticket, qr_url }
    }

    fn ticket_from_intent(&self, intent: &PaymentIntent) -> Result<Ticket, Error> {
        let form = CheckoutForm::from_metadata(&intent.metadata).map_err(|err| {
            warn!(payment_intent_id = %intent.id, error = %err, "intent metadata unusable");
            Error::invalid_request(format!("payment intent cannot be ticketed: {err}"))
                .with_details(json!({ "code": "invalid_metadata" }))
        })?;
        Ok(Ticket {
            id: Uuid::new_v4(),
            payment_intent_id: intent.id.clone(),
            name: form.contact.name,
            email: form.contact.email,
            phone: form.contact.phone,
            event_id: form.event_id,
            quantity: form.quantity,
            amount_cents: intent.amount_cents,
            checked_in: false,
            checked_in_at: None,
            created_at: self.clock.utc(),
        })
    }
}

fn map_ticket_error(error: TicketRepositoryError) -> Error {
    match error {
        TicketRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ticket store unavailable: {message}"))
        }
        TicketRepositoryError::Query { message } | TicketRepositoryError::Duplicate { message } => {
            Error::internal(format!("ticket store error: {message}"))
        }
    }
}

fn ticket_not_found(payment_intent_id: &PaymentIntentId) -> Error {
    Error::not_found(format!("no ticket for payment {payment_intent_id}"))
}

impl<T: ?Sized, G: ?Sized> TicketService<T, G>
where
    T: TicketRepository,
{
    async fn existing(&self, payment_intent_id: &PaymentIntentId) -> Result<Option<Ticket>, Error> {
        self.tickets
            .find_by_payment_intent(payment_intent_id)
            .await
            .map_err(map_ticket_error)
    }

    async fn required(&self, payment_intent_id: &PaymentIntentId) -> Result<Ticket, Error> {
        self.existing(payment_intent_id)
            .await?
            .ok_or_else(|| ticket_not_found(payment_intent_id))
    }
}

#[async_trait]
impl<T: ?Sized, G: ?Sized> TicketCommand for TicketService<T, G>
where
    T: TicketRepository,
    G: PaymentGateway,
{
    async fn issue(&self, payment_intent_id: PaymentIntentId) -> Result<IssuedTicket, Error> {
        let intent = self
            .gateway
            .retrieve_intent(&payment_intent_id)
            .await
            .map_err(map_gateway_error)?;
        if intent.status != PaymentStatus::Succeeded {
            return Err(Error::payment_required("payment has not succeeded")
                .with_details(json!({ "status": intent.status.as_str() })));
        }

        if let Some(ticket) = self.existing(&payment_intent_id).await? {
            return Ok(IssuedTicket {
                view: self.view(ticket),
                created: false,
            });
        }

        let ticket = self.ticket_from_intent(&intent)?;
        match self.tickets.insert(&ticket).await {
            Ok(()) => {
                info!(
                    payment_intent_id = %ticket.payment_intent_id,
                    ticket_id = %ticket.id,
                    "ticket issued"
                );
                Ok(IssuedTicket {
                    view: self.view(ticket),
                    created: true,
                })
            }
            Err(TicketRepositoryError::Duplicate { .. }) => {
                // A concurrent request won the insert.
                let ticket = self.required(&payment_intent_id).await?;
                Ok(IssuedTicket {
                    view: self.view(ticket),
                    created: false,
                })
            }
            Err(err) => Err(map_ticket_error(err)),
        }
    }

    async fn toggle_check_in(
        &self,
        actor: Option<SessionUser>,
        payment_intent_id: PaymentIntentId,
    ) -> Result<TicketView, Error> {
        let admin = authorize_admin(actor)?;
        let ticket = self.required(&payment_intent_id).await?;
        let checked_in_at = ticket.toggled_check_in(self.clock.utc());
        let updated = self
            .tickets
            .update_check_in(&payment_intent_id, checked_in_at)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| ticket_not_found(&payment_intent_id))?;
        info!(
            payment_intent_id = %payment_intent_id,
            admin_id = %admin.id,
            checked_in = updated.checked_in,
            "ticket check-in toggled"
        );
        Ok(self.view(updated))
    }
}

#[async_trait]
impl<T: ?Sized, G: ?Sized> TicketQuery for TicketService<T, G>
where
    T: TicketRepository,
    G: PaymentGateway,
{
    async fn find(&self, payment_intent_id: PaymentIntentId) -> Result<TicketView, Error> {
        self.required(&payment_intent_id).await.map(|t| self.view(t))
    }

    async fn scan(
        &self,
        actor: Option<SessionUser>,
        payment_intent_id: PaymentIntentId,
    ) -> Result<TicketView, Error> {
        authorize_admin(actor)?;
        self.find(payment_intent_id).await
    }
}
