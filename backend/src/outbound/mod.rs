//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **supabase**: hosted Postgres REST tables and passwordless auth
//! - **stripe**: card payment intents
//! - **memory**: process-local stand-ins for local development and tests
//!
//! Adapters are thin translators between domain types and wire
//! representations. They contain no business logic.

pub mod http;
pub mod memory;
pub mod stripe;
pub mod supabase;
