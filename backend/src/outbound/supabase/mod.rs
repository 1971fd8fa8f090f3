//! Adapters for the hosted database and auth provider.
//!
//! All table access goes through [`SupabaseClient`], which speaks the REST
//! table API (`/rest/v1/{table}`). [`SupabaseAuthProvider`] wraps the
//! passwordless sign-in endpoints under `/auth/v1`.

mod attendees;
mod auth;
mod client;
mod dto;
mod events;
mod tickets;
mod waitlist;

pub use attendees::SupabaseAttendeeRepository;
pub use auth::SupabaseAuthProvider;
pub use client::{Filter, SupabaseClient, SupabaseSettings};
pub use events::SupabaseEventRepository;
pub use tickets::SupabaseTicketRepository;
pub use waitlist::SupabaseWaitlistRepository;
