//! Driving port for admin event management.
//!
//! Every operation takes the signed-in caller, if any. Anonymous callers are
//! rejected with `401` and non-admins with `403`.

use async_trait::async_trait;

use crate::domain::{Error, Event, EventDraft, EventId, SessionUser};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    async fn create(&self, actor: Option<SessionUser>, draft: EventDraft) -> Result<Event, Error>;

    async fn update(
        &self,
        actor: Option<SessionUser>,
        id: EventId,
        draft: EventDraft,
    ) -> Result<Event, Error>;

    async fn delete(&self, actor: Option<SessionUser>, id: EventId) -> Result<(), Error>;
}
