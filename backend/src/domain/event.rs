//! Events listed on the site and managed by admins.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{MAX_AMOUNT_CENTS, UserId};

/// Maximum event title length.
pub const TITLE_MAX: usize = 120;

/// Stable event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub price_cents: u64,
    pub capacity: Option<u32>,
    pub image_url: Option<Url>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Build an event from a validated draft.
    pub fn from_draft(
        id: EventId,
        draft: EventDraft,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let EventDraft {
            title,
            description,
            location,
            starts_at,
            ends_at,
            price_cents,
            capacity,
            image_url,
        } = draft;
        Self {
            id,
            title,
            description,
            location,
            starts_at,
            ends_at,
            price_cents,
            capacity,
            image_url,
            created_by,
            created_at,
        }
    }

    /// Replace the editable fields, keeping identity and provenance.
    pub fn apply(self, draft: EventDraft) -> Self {
        Self::from_draft(self.id, draft, self.created_by, self.created_at)
    }
}

/// Order events for listing: upcoming ones soonest first, then past ones
/// most recent first.
pub fn sort_upcoming_first(events: &mut [Event], now: DateTime<Utc>) {
    events.sort_by(|left, right| {
        let left_past = left.starts_at < now;
        let right_past = right.starts_at < now;
        left_past.cmp(&right_past).then_with(|| {
            if left_past {
                right.starts_at.cmp(&left.starts_at)
            } else {
                left.starts_at.cmp(&right.starts_at)
            }
        })
    });
}

/// Validation errors raised by [`EventDraft::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("location must not be empty")]
    EmptyLocation,
    #[error("endsAt must be after startsAt")]
    EndsBeforeStart,
    #[error("priceCents must be at most {max}")]
    PriceTooHigh { max: u64 },
    #[error("capacity must be at least 1")]
    ZeroCapacity,
}

impl EventValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyLocation => "location",
            Self::EndsBeforeStart => "endsAt",
            Self::PriceTooHigh { .. } => "priceCents",
            Self::ZeroCapacity => "capacity",
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::TitleTooLong { .. } => "title_too_long",
            Self::EmptyLocation => "empty_location",
            Self::EndsBeforeStart => "ends_before_start",
            Self::PriceTooHigh { .. } => "price_too_high",
            Self::ZeroCapacity => "zero_capacity",
        }
    }
}

/// Editable event fields, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    title: String,
    description: String,
    location: String,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    price_cents: u64,
    capacity: Option<u32>,
    image_url: Option<Url>,
}

/// Unvalidated event fields as received from a client.
#[derive(Debug, Clone)]
pub struct EventDraftParts {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub price_cents: u64,
    pub capacity: Option<u32>,
    pub image_url: Option<Url>,
}

impl EventDraft {
    /// Validate client-supplied event fields.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use site_backend::domain::{EventDraft, EventDraftParts, EventValidationError};
    ///
    /// let starts_at = Utc.with_ymd_and_hms(2026, 6, 1, 19, 0, 0).single().expect("time");
    /// let parts = EventDraftParts {
    ///     title: "  Singles mixer ".into(),
    ///     description: String::new(),
    ///     location: "Brooklyn".into(),
    ///     starts_at,
    ///     ends_at: None,
    ///     price_cents: 2500,
    ///     capacity: Some(80),
    ///     image_url: None,
    /// };
    /// let draft = EventDraft::new(parts.clone()).expect("valid draft");
    /// assert_eq!(draft.title(), "Singles mixer");
    ///
    /// let err = EventDraft::new(EventDraftParts { capacity: Some(0), ..parts })
    ///     .expect_err("capacity must be positive");
    /// assert_eq!(err, EventValidationError::ZeroCapacity);
    /// ```
    pub fn new(parts: EventDraftParts) -> Result<Self, EventValidationError> {
        let title = parts.title.trim().to_owned();
        if title.is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(EventValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let location = parts.location.trim().to_owned();
        if location.is_empty() {
            return Err(EventValidationError::EmptyLocation);
        }
        if parts.ends_at.is_some_and(|ends_at| ends_at <= parts.starts_at) {
            return Err(EventValidationError::EndsBeforeStart);
        }
        if parts.price_cents > MAX_AMOUNT_CENTS {
            return Err(EventValidationError::PriceTooHigh {
                max: MAX_AMOUNT_CENTS,
            });
        }
        if parts.capacity == Some(0) {
            return Err(EventValidationError::ZeroCapacity);
        }

        Ok(Self {
            title,
            description: parts.description.trim().to_owned(),
            location,
            starts_at: parts.starts_at,
            ends_at: parts.ends_at,
            price_cents: parts.price_cents,
            capacity: parts.capacity,
            image_url: parts.image_url,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn price_cents(&self) -> u64 {
        self.price_cents
    }
}
