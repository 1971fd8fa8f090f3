//! Driven port for event persistence.

use async_trait::async_trait;

use crate::domain::{Event, EventId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "event repository connection failed: {message}",
        /// The store rejected or failed the request.
        Query { message: String } =>
            "event repository query failed: {message}",
    }
}

/// CRUD operations over stored events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// List events ordered by start time, optionally only those created by
    /// `created_by`.
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Event>, EventRepositoryError>;

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError>;

    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError>;

    /// Replace a stored event. Returns `false` when no event matches.
    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError>;

    /// Remove an event. Returns `false` when no event matches.
    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError>;
}
