//! Event listing and admin management.
//!
//! ```text
//! GET    /api/events?mine=1
//! POST   /api/events
//! GET    /api/events/{id}
//! PUT    /api/events/{id}
//! DELETE /api/events/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Event, EventDraft, EventDraftParts};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::SessionUserResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{event_error, field_error, parse_event_id};

/// Public view of an event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub price_cents: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.as_uuid().to_string(),
            title: event.title,
            description: event.description,
            location: event.location,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            price_cents: event.price_cents,
            capacity: event.capacity,
            image_url: event.image_url.map(String::from),
            created_by: event.created_by.map(|id| id.to_string()),
            created_at: event.created_at,
        }
    }
}

/// Editable event fields.
///
/// Example JSON:
/// `{"title":"Singles mixer","location":"Brooklyn","startsAt":"2026-11-06T19:00:00Z","priceCents":2500}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price_cents: u64,
    pub capacity: Option<u32>,
    pub image_url: Option<String>,
}

impl TryFrom<EventRequest> for EventDraft {
    type Error = Error;

    fn try_from(value: EventRequest) -> Result<Self, Self::Error> {
        let image_url = value
            .image_url
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Url::parse(raw.trim()))
            .transpose()
            .map_err(|_| field_error("imageUrl", "invalid_url", "imageUrl must be an absolute URL"))?;
        EventDraft::new(EventDraftParts {
            title: value.title,
            description: value.description,
            location: value.location,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            price_cents: value.price_cents,
            capacity: value.capacity,
            image_url,
        })
        .map_err(event_error)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsListQuery {
    /// `1` restricts the list to events created by the signed-in user.
    pub mine: Option<String>,
}

impl EventsListQuery {
    fn mine(&self) -> bool {
        matches!(self.mine.as_deref(), Some("1" | "true"))
    }
}

/// Event list together with the caller's session, if any.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsListResponse {
    pub events: Vec<EventResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUserResponse>,
}

/// List events by start time.
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsListQuery),
    responses(
        (status = 200, description = "Events", body = EventsListResponse),
        (status = 401, description = "`mine=1` without a session", body = Error),
        (status = 503, description = "Event store unavailable", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<EventsListQuery>,
) -> ApiResult<web::Json<EventsListResponse>> {
    let user = session.user();
    let events = state.events_query.list(query.mine(), user.clone()).await?;
    Ok(web::Json(EventsListResponse {
        events: events.into_iter().map(EventResponse::from).collect(),
        user: user.as_ref().map(SessionUserResponse::from),
    }))
}

/// Fetch one event.
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "getEvent",
    security([])
)]
#[get("/events/{id}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventResponse>> {
    let id = parse_event_id(&path.into_inner())?;
    let event = state.events_query.get(id).await?;
    Ok(web::Json(EventResponse::from(event)))
}

/// Create an event.
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Created", body = EventResponse),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EventRequest>,
) -> ApiResult<HttpResponse> {
    let draft = EventDraft::try_from(payload.into_inner())?;
    let event = state.events.create(session.user(), draft).await?;
    info!(event_id = %event.id.as_uuid(), "event created");
    Ok(HttpResponse::Created().json(EventResponse::from(event)))
}

/// Replace an event's editable fields.
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Updated", body = EventResponse),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/events/{id}")]
pub async fn update_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<EventRequest>,
) -> ApiResult<web::Json<EventResponse>> {
    let id = parse_event_id(&path.into_inner())?;
    let draft = EventDraft::try_from(payload.into_inner())?;
    let event = state.events.update(session.user(), id, draft).await?;
    Ok(web::Json(EventResponse::from(event)))
}

/// Delete an event.
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not an admin", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_event_id(&path.into_inner())?;
    state.events.delete(session.user(), id).await?;
    info!(event_id = %id.as_uuid(), "event deleted");
    Ok(HttpResponse::NoContent().finish())
}
