//! Event listing and admin event management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::payment_service::map_event_error;
use super::ports::{EventCommand, EventQuery, EventRepository};
use super::{
    Error, Event, EventDraft, EventId, SessionUser, authorize_admin, sort_upcoming_first,
};

/// Event service implementing [`EventQuery`] and [`EventCommand`].
#[derive(Clone)]
pub struct EventService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> EventService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

fn event_not_found(id: EventId) -> Error {
    Error::not_found(format!("event {id} not found"))
}

#[async_trait]
impl<R: ?Sized> EventQuery for EventService<R>
where
    R: EventRepository,
{
    async fn list(&self, mine: bool, actor: Option<SessionUser>) -> Result<Vec<Event>, Error> {
        let created_by = if mine {
            let user = actor.ok_or_else(|| Error::unauthorized("sign in to see your events"))?;
            Some(user.id)
        } else {
            None
        };
        let mut events = self
            .repo
            .list(created_by)
            .await
            .map_err(map_event_error)?;
        sort_upcoming_first(&mut events, self.clock.utc());
        Ok(events)
    }

    async fn get(&self, id: EventId) -> Result<Event, Error> {
        self.repo
            .find_by_id(&id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| event_not_found(id))
    }
}

#[async_trait]
impl<R: ?Sized> EventCommand for EventService<R>
where
    R: EventRepository,
{
    async fn create(&self, actor: Option<SessionUser>, draft: EventDraft) -> Result<Event, Error> {
        let admin = authorize_admin(actor)?;
        let event = Event::from_draft(EventId::random(), draft, Some(admin.id), self.clock.utc());
        self.repo.insert(&event).await.map_err(map_event_error)?;
        info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    async fn update(
        &self,
        actor: Option<SessionUser>,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, Error> {
        authorize_admin(actor)?;
        let current = self
            .repo
            .find_by_id(&id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| event_not_found(id))?;
        let updated = current.apply(draft);
        if !self.repo.update(&updated).await.map_err(map_event_error)? {
            return Err(event_not_found(id));
        }
        info!(event_id = %id, "event updated");
        Ok(updated)
    }

    async fn delete(&self, actor: Option<SessionUser>, id: EventId) -> Result<(), Error> {
        authorize_admin(actor)?;
        if !self.repo.delete(&id).await.map_err(map_event_error)? {
            return Err(event_not_found(id));
        }
        info!(event_id = %id, "event deleted");
        Ok(())
    }
}
