//! Tickets issued after a successful card payment.
//!
//! A ticket is keyed by the payment intent that paid for it, so the QR code
//! printed on the ticket only needs to carry the intent id. Door staff open
//! the encoded scan URL and toggle the check-in flag.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use super::{Email, EventId, PaymentIntentId, PersonName, PhoneNumber, Quantity};

/// A paid ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: Uuid,
    pub payment_intent_id: PaymentIntentId,
    pub name: PersonName,
    pub email: Email,
    pub phone: PhoneNumber,
    pub event_id: Option<EventId>,
    pub quantity: Quantity,
    pub amount_cents: u64,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Check-in timestamp after flipping the flag at `now`.
    pub fn toggled_check_in(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.checked_in { None } else { Some(now) }
    }
}

/// Build the admin scan link a ticket's QR code encodes.
///
/// # Examples
/// ```
/// use site_backend::domain::{PaymentIntentId, scan_url};
/// use url::Url;
///
/// let base = Url::parse("https://events.example.com/").expect("base url");
/// let pi = PaymentIntentId::new("pi_3Nq1x2LkdIwHu7ix0").expect("intent id");
/// assert_eq!(
///     scan_url(&base, &pi).as_str(),
///     "https://events.example.com/admin/scan?pi=pi_3Nq1x2LkdIwHu7ix0"
/// );
/// ```
pub fn scan_url(base: &Url, payment_intent_id: &PaymentIntentId) -> Url {
    let mut url = base.clone();
    let path = format!("{}/admin/scan", base.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("pi", payment_intent_id.as_ref());
    url
}

/// Ticket together with the link its QR code encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketView {
    pub ticket: Ticket,
    pub qr_url: Url,
}

/// Result of issuing a ticket for a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTicket {
    pub view: TicketView,
    /// `false` when the ticket already existed for the intent.
    pub created: bool,
}
