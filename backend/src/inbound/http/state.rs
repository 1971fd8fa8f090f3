//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AttendeeCommand, EventCommand, EventQuery, OtpLogin, PaymentCommand, TicketCommand,
    TicketQuery, WaitlistCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub waitlist: Arc<dyn WaitlistCommand>,
    pub attendees: Arc<dyn AttendeeCommand>,
    pub payments: Arc<dyn PaymentCommand>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub login: Arc<dyn OtpLogin>,
}
