//! In-memory repositories for local development and tests.
//!
//! Each store guards a plain collection with a `std::sync::RwLock`. Lock
//! poisoning surfaces as a query error rather than a panic.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use crate::domain::ports::{
    AttendeeRepository, AttendeeRepositoryError, EventRepository, EventRepositoryError,
    TicketRepository, TicketRepositoryError, WaitlistRepository, WaitlistRepositoryError,
};
use crate::domain::{
    Attendee, Email, Event, EventId, PaymentIntentId, PhoneNumber, Ticket, UserId, WaitlistEntry,
    sort_upcoming_first,
};

fn poisoned<T>(_: PoisonError<T>) -> String {
    "in-memory store lock poisoned".to_owned()
}

/// Waitlist signups keyed by id.
#[derive(Debug, Default)]
pub struct MemoryWaitlistRepository {
    entries: RwLock<BTreeMap<Uuid, WaitlistEntry>>,
}

impl MemoryWaitlistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored signups.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(
        &self,
        predicate: impl Fn(&WaitlistEntry) -> bool,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        let entries = self
            .entries
            .read()
            .map_err(|err| WaitlistRepositoryError::query(poisoned(err)))?;
        Ok(entries.values().find(|entry| predicate(entry)).cloned())
    }
}

#[async_trait]
impl WaitlistRepository for MemoryWaitlistRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        self.find(|entry| &entry.email == email)
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        self.find(|entry| &entry.phone == phone)
    }

    async fn insert(&self, entry: &WaitlistEntry) -> Result<(), WaitlistRepositoryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| WaitlistRepositoryError::query(poisoned(err)))?;
        if entries.values().any(|existing| existing.email == entry.email) {
            return Err(WaitlistRepositoryError::duplicate(entry.email.to_string()));
        }
        entries.insert(entry.id, entry.clone());
        Ok(())
    }
}

/// Attendees keyed by id.
#[derive(Debug, Default)]
pub struct MemoryAttendeeRepository {
    attendees: RwLock<BTreeMap<Uuid, Attendee>>,
}

impl MemoryAttendeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(
        &self,
        predicate: impl Fn(&Attendee) -> bool,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        let attendees = self
            .attendees
            .read()
            .map_err(|err| AttendeeRepositoryError::query(poisoned(err)))?;
        Ok(attendees.values().find(|attendee| predicate(attendee)).cloned())
    }
}

#[async_trait]
impl AttendeeRepository for MemoryAttendeeRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        self.find(|attendee| &attendee.email == email)
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        self.find(|attendee| &attendee.phone == phone)
    }

    async fn insert(&self, attendee: &Attendee) -> Result<(), AttendeeRepositoryError> {
        self.attendees
            .write()
            .map_err(|err| AttendeeRepositoryError::query(poisoned(err)))?
            .insert(attendee.id, attendee.clone());
        Ok(())
    }
}

/// Tickets keyed by payment intent.
#[derive(Debug, Default)]
pub struct MemoryTicketRepository {
    tickets: RwLock<BTreeMap<String, Ticket>>,
}

impl MemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketRepository for MemoryTicketRepository {
    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &PaymentIntentId,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let tickets = self
            .tickets
            .read()
            .map_err(|err| TicketRepositoryError::query(poisoned(err)))?;
        Ok(tickets.get(payment_intent_id.as_ref()).cloned())
    }

    async fn insert(&self, ticket: &Ticket) -> Result<(), TicketRepositoryError> {
        let mut tickets = self
            .tickets
            .write()
            .map_err(|err| TicketRepositoryError::query(poisoned(err)))?;
        let key = ticket.payment_intent_id.to_string();
        if tickets.contains_key(&key) {
            return Err(TicketRepositoryError::duplicate(key));
        }
        tickets.insert(key, ticket.clone());
        Ok(())
    }

    async fn update_check_in(
        &self,
        payment_intent_id: &PaymentIntentId,
        checked_in_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Ticket>, TicketRepositoryError> {
        let mut tickets = self
            .tickets
            .write()
            .map_err(|err| TicketRepositoryError::query(poisoned(err)))?;
        Ok(tickets.get_mut(payment_intent_id.as_ref()).map(|ticket| {
            ticket.checked_in = checked_in_at.is_some();
            ticket.checked_in_at = checked_in_at;
            ticket.clone()
        }))
    }
}

/// Events keyed by id, listed upcoming-first against `clock`.
pub struct MemoryEventRepository {
    events: RwLock<BTreeMap<Uuid, Event>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryEventRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl std::fmt::Debug for MemoryEventRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventRepository")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            events: RwLock::default(),
            clock,
        }
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<Uuid, Event>>, EventRepositoryError> {
        self.events
            .write()
            .map_err(|err| EventRepositoryError::query(poisoned(err)))
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn list(&self, created_by: Option<UserId>) -> Result<Vec<Event>, EventRepositoryError> {
        let events = self
            .events
            .read()
            .map_err(|err| EventRepositoryError::query(poisoned(err)))?;
        let mut listed: Vec<Event> = events
            .values()
            .filter(|event| {
                created_by
                    .as_ref()
                    .is_none_or(|user| event.created_by.as_ref() == Some(user))
            })
            .cloned()
            .collect();
        sort_upcoming_first(&mut listed, self.clock.utc());
        Ok(listed)
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        let events = self
            .events
            .read()
            .map_err(|err| EventRepositoryError::query(poisoned(err)))?;
        Ok(events.get(id.as_uuid()).cloned())
    }

    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        self.write()?.insert(*event.id.as_uuid(), event.clone());
        Ok(())
    }

    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError> {
        let mut events = self.write()?;
        match events.get_mut(event.id.as_uuid()) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        Ok(self.write()?.remove(id.as_uuid()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_clock::{fixture_clock, fixture_timestamp};
    use crate::domain::{PersonName, Quantity};
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, hour, 0, 0)
            .single()
            .expect("time")
    }

    fn event(hour: u32, created_by: Option<UserId>) -> Event {
        Event {
            id: EventId::random(),
            title: format!("Event at {hour}"),
            description: String::new(),
            location: "Austin".into(),
            starts_at: at(hour),
            ends_at: None,
            price_cents: 1000,
            capacity: None,
            image_url: None,
            created_by,
            created_at: at(0),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn events_list_by_start_and_creator() {
        let repo = MemoryEventRepository::with_clock(fixture_clock());
        let owner = UserId::random();
        let late = event(21, Some(owner.clone()));
        let early = event(18, None);
        repo.insert(&late).await.expect("insert");
        repo.insert(&early).await.expect("insert");

        let all = repo.list(None).await.expect("list");
        assert_eq!(
            all.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![early.id, late.id]
        );
        let mine = repo.list(Some(owner)).await.expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, late.id);
    }

    #[rstest]
    #[tokio::test]
    async fn past_events_follow_upcoming_ones() {
        let repo = MemoryEventRepository::with_clock(fixture_clock());
        let mut finished = event(20, None);
        finished.starts_at = fixture_timestamp() - chrono::Duration::days(30);
        let upcoming = event(19, None);
        repo.insert(&finished).await.expect("insert");
        repo.insert(&upcoming).await.expect("insert");

        let listed = repo.list(None).await.expect("list");
        assert_eq!(
            listed.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![upcoming.id, finished.id]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn second_ticket_for_intent_is_duplicate() {
        let repo = MemoryTicketRepository::new();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            payment_intent_id: PaymentIntentId::generate(),
            name: PersonName::new("Ada").expect("name"),
            email: Email::new("ada@example.com").expect("email"),
            phone: PhoneNumber::new("4155550100").expect("phone"),
            event_id: None,
            quantity: Quantity::default(),
            amount_cents: 1000,
            checked_in: false,
            checked_in_at: None,
            created_at: at(9),
        };
        repo.insert(&ticket).await.expect("first insert");
        let err = repo.insert(&ticket).await.expect_err("duplicate");
        assert!(matches!(err, TicketRepositoryError::Duplicate { .. }));

        let updated = repo
            .update_check_in(&ticket.payment_intent_id, Some(at(20)))
            .await
            .expect("update")
            .expect("ticket");
        assert!(updated.checked_in);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_events_report_false() {
        let repo = MemoryEventRepository::new();
        let stray = event(12, None);
        assert!(!repo.update(&stray).await.expect("update"));
        assert!(!repo.delete(&stray.id).await.expect("delete"));
    }
}
