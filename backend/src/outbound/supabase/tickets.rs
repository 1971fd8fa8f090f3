//! Ticket repository backed by the `tickets` table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::client::{Filter, SupabaseClient};
use super::dto::{CheckInPatch, TICKETS_TABLE, TicketRow};
use crate::domain::ports::{TicketRepository, TicketRepositoryError};
use crate::domain::{PaymentIntentId, Ticket};
use crate::outbound::http::RemoteError;

/// [`TicketRepository`] over the hosted REST table API.
///
/// Relies on a unique constraint over `tickets.payment_intent_id`; a second
/// insert for the same intent comes back as `409`.
#[derive(Clone)]
pub struct SupabaseTicketRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseTicketRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

fn map_remote_error(error: RemoteError) -> TicketRepositoryError {
    match error {
        RemoteError::Conflict { message } => TicketRepositoryError::duplicate(message),
        other if other.is_connectivity() => TicketRepositoryError::connection(other.to_string()),
        other => TicketRepositoryError::query(other.to_string()),
    }
}

fn first_ticket(rows: Vec<TicketRow>) -> Result<Option<Ticket>, TicketRepositoryError> {
    rows.into_iter()
        .next()
        .map(Ticket::try_from)
        .transpose()
        .map_err(TicketRepositoryError::query)
}

#[async_trait]
impl TicketRepository for SupabaseTicketRepository {
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let rows = self
            .client
            .select(
                TICKETS_TABLE,
                &[Filter::eq("payment_intent_id", payment_intent_id)],
                None,
            )
            .await
            .map_err(map_remote_error)?;
        first_ticket(rows)
    }

    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let _: Vec<TicketRow> = self
            .client
            .insert(TICKETS_TABLE, &TicketRow::from(ticket))
            .await
            .map_err(map_remote_error)?;
        Ok(())
    }

    async fn update_check_in(
        &self,
        payment_intent_id: &PaymentIntentId,
        checked_in_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let patch = CheckInPatch {
            checked_in: checked_in_at.is_some(),
            checked_in_at,
        };
        let rows = self
            .client
            .update(
                TICKETS_TABLE,
                &[Filter::eq("payment_intent_id", payment_intent_id)],
                &patch,
            )
            .await
            .map_err(map_remote_error)?;
        first_ticket(rows)
    }
}
