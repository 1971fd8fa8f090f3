//! Row shapes for the hosted database tables.
//!
//! Rows decode into these transport DTOs first and are validated into domain
//! types in one pass. Stored values that no longer pass domain validation are
//! reported as decode failures rather than silently dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::domain::{
    Attendee, Email, Event, EventId, PaymentIntentId, PersonName, PhoneNumber, Quantity, Ticket,
    UserId, WaitlistEntry,
};

pub(super) const WAITLIST_TABLE: &str = "waitlist";
pub(super) const ATTENDEES_TABLE: &str = "attendees";
pub(super) const TICKETS_TABLE: &str = "tickets";
pub(super) const EVENTS_TABLE: &str = "events";

fn invalid(table: &str, column: &str, err: impl std::fmt::Display) -> String {
    format!("{table}.{column} holds an invalid value: {err}")
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ContactRow {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) phone: String,
    pub(super) created_at: DateTime<Utc>,
}

struct ValidContact {
    name: PersonName,
    email: Email,
    phone: PhoneNumber,
}

impl ContactRow {
    fn validate(&self, table: &str) -> Result<ValidContact, String> {
        Ok(ValidContact {
            name: PersonName::new(&self.name).map_err(|err| invalid(table, "name", err))?,
            email: Email::new(&self.email).map_err(|err| invalid(table, "email", err))?,
            phone: PhoneNumber::new(&self.phone).map_err(|err| invalid(table, "phone", err))?,
        })
    }
}

impl From<&WaitlistEntry> for ContactRow {
    fn from(entry: &WaitlistEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.to_string(),
            email: entry.email.to_string(),
            phone: entry.phone.to_string(),
            created_at: entry.created_at,
        }
    }
}

impl From<&Attendee> for ContactRow {
    fn from(attendee: &Attendee) -> Self {
        Self {
            id: attendee.id,
            name: attendee.name.to_string(),
            email: attendee.email.to_string(),
            phone: attendee.phone.to_string(),
            created_at: attendee.created_at,
        }
    }
}

impl ContactRow {
    pub(super) fn into_waitlist_entry(self) -> Result<WaitlistEntry, String> {
        let contact = self.validate(WAITLIST_TABLE)?;
        Ok(WaitlistEntry {
            id: self.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            created_at: self.created_at,
        })
    }

    pub(super) fn into_attendee(self) -> Result<Attendee, String> {
        let contact = self.validate(ATTENDEES_TABLE)?;
        Ok(Attendee {
            id: self.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct TicketRow {
    pub(super) id: Uuid,
    pub(super) payment_intent_id: String,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) phone: String,
    pub(super) event_id: Option<Uuid>,
    pub(super) quantity: u8,
    pub(super) amount_cents: u64,
    pub(super) checked_in: bool,
    pub(super) checked_in_at: Option<DateTime<Utc>>,
    pub(super) created_at: DateTime<Utc>,
}

/// Partial update applied when toggling check-in.
#[derive(Debug, Serialize)]
pub(super) struct CheckInPatch {
    pub(super) checked_in: bool,
    pub(super) checked_in_at: Option<DateTime<Utc>>,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            payment_intent_id: ticket.payment_intent_id.to_string(),
            name: ticket.name.to_string(),
            email: ticket.email.to_string(),
            phone: ticket.phone.to_string(),
            event_id: ticket.event_id.map(|id| *id.as_uuid()),
            quantity: ticket.quantity.get(),
            amount_cents: ticket.amount_cents,
            checked_in: ticket.checked_in,
            checked_in_at: ticket.checked_in_at,
            created_at: ticket.created_at,
        }
    }
}

impl TryFrom<TicketRow> for Ticket {
    type Error = String;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let table = TICKETS_TABLE;
        Ok(Self {
            id: row.id,
            payment_intent_id: PaymentIntentId::new(&row.payment_intent_id)
                .map_err(|err| invalid(table, "payment_intent_id", err))?,
            name: PersonName::new(&row.name).map_err(|err| invalid(table, "name", err))?,
            email: Email::new(&row.email).map_err(|err| invalid(table, "email", err))?,
            phone: PhoneNumber::new(&row.phone).map_err(|err| invalid(table, "phone", err))?,
            event_id: row.event_id.map(EventId::from_uuid),
            quantity: Quantity::new(row.quantity).map_err(|err| invalid(table, "quantity", err))?,
            amount_cents: row.amount_cents,
            checked_in: row.checked_in,
            checked_in_at: row.checked_in_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct EventRow {
    pub(super) id: Uuid,
    pub(super) title: String,
    #[serde(default)]
    pub(super) description: String,
    pub(super) location: String,
    pub(super) starts_at: DateTime<Utc>,
    pub(super) ends_at: Option<DateTime<Utc>>,
    pub(super) price_cents: u64,
    pub(super) capacity: Option<u32>,
    pub(super) image_url: Option<String>,
    pub(super) created_by: Option<String>,
    pub(super) created_at: DateTime<Utc>,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            price_cents: event.price_cents,
            capacity: event.capacity,
            image_url: event.image_url.as_ref().map(Url::to_string),
            created_by: event.created_by.as_ref().map(UserId::to_string),
            created_at: event.created_at,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = String;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let table = EVENTS_TABLE;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            price_cents: row.price_cents,
            capacity: row.capacity,
            image_url: row
                .image_url
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| Url::parse(&raw))
                .transpose()
                .map_err(|err| invalid(table, "image_url", err))?,
            created_by: row
                .created_by
                .map(UserId::new)
                .transpose()
                .map_err(|err| invalid(table, "created_by", err))?,
            created_at: row.created_at,
        })
    }
}
