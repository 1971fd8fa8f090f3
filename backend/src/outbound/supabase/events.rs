//! Event repository backed by the `events` table.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{Filter, SupabaseClient};
use super::dto::{EVENTS_TABLE, EventRow};
use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{Event, EventId, UserId};
use crate::outbound::http::RemoteError;

const ORDER_BY_START: &str = "starts_at.asc";

/// [`EventRepository`] over the hosted REST table API.
#[derive(Clone)]
pub struct SupabaseEventRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseEventRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

fn map_remote_error(error: RemoteError) -> EventRepositoryError {
    if error.is_connectivity() {
        EventRepositoryError::connection(error.to_string())
    } else {
        EventRepositoryError::query(error.to_string())
    }
}

fn decode(rows: Vec<EventRow>) -> Result<Vec<Event>, EventRepositoryError> {
    rows.into_iter()
        .map(Event::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(EventRepositoryError::query)
}

fn id_filter(id: &EventId) -> [Filter; 1] {
    [Filter::eq("id", id)]
}

#[async_trait]
impl EventRepository for SupabaseEventRepository {
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Event>, EventRepositoryError> {
        let filters: Vec<Filter> = created_by
            .map(|user| Filter::eq("created_by", user))
            .into_iter()
            .collect();
        let rows = self
            .client
            .select(EVENTS_TABLE, &filters, Some(ORDER_BY_START))
            .await
            .map_err(map_remote_error)?;
        decode(rows)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        let rows = self
            .client
            .select(EVENTS_TABLE, &id_filter(id), None)
            .await
            .map_err(map_remote_error)?;
        Ok(decode(rows)?.into_iter().next())
    }

    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        let _: Vec<EventRow> = self
            .client
            .insert(EVENTS_TABLE, &EventRow::from(event))
            .await
            .map_err(map_remote_error)?;
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError> {
        let rows: Vec<EventRow> = self
            .client
            .update(EVENTS_TABLE, &id_filter(&event.id), &EventRow::from(event))
            .await
            .map_err(map_remote_error)?;
        Ok(!rows.is_empty())
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        let rows: Vec<EventRow> = self
            .client
            .delete(EVENTS_TABLE, &id_filter(id))
            .await
            .map_err(map_remote_error)?;
        Ok(!rows.is_empty())
    }
}
