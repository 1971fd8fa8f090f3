//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`PaymentGateway`], [`IdentityProvider`]) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`OtpLogin`]) are implemented by domain services and called by inbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod attendee_command;
mod attendee_repository;
mod event_command;
mod event_query;
mod event_repository;
mod identity_provider;
mod otp_login;
mod payment_command;
mod payment_gateway;
mod ticket_command;
mod ticket_query;
mod ticket_repository;
mod waitlist_command;
mod waitlist_repository;

pub use attendee_command::AttendeeCommand;
#[cfg(test)]
pub use attendee_command::MockAttendeeCommand;
#[cfg(test)]
pub use attendee_repository::MockAttendeeRepository;
pub use attendee_repository::{AttendeeRepository, AttendeeRepositoryError};
pub use event_command::EventCommand;
#[cfg(test)]
pub use event_command::MockEventCommand;
pub use event_query::EventQuery;
#[cfg(test)]
pub use event_query::MockEventQuery;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{IdentityProvider, IdentityProviderError};
#[cfg(test)]
pub use otp_login::MockOtpLogin;
pub use otp_login::OtpLogin;
#[cfg(test)]
pub use payment_command::MockPaymentCommand;
pub use payment_command::PaymentCommand;
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{PaymentGateway, PaymentGatewayError};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::TicketCommand;
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::TicketQuery;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketRepository, TicketRepositoryError};
#[cfg(test)]
pub use waitlist_command::MockWaitlistCommand;
pub use waitlist_command::WaitlistCommand;
#[cfg(test)]
pub use waitlist_repository::MockWaitlistRepository;
pub use waitlist_repository::{WaitlistRepository, WaitlistRepositoryError};
