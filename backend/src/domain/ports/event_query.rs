//! Driving port for public event listings.

use async_trait::async_trait;

use crate::domain::{Error, Event, EventId, SessionUser};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// List events by start time. With `mine`, only events created by the
    /// signed-in caller are returned and a session is required.
    async fn list(&self, mine: bool, actor: Option<SessionUser>) -> Result<Vec<Event>, Error>;

    async fn get(&self, id: EventId) -> Result<Event, Error>;
}
