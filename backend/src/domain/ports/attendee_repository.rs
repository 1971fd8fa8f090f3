//! Driven port for checkout attendee persistence.

use async_trait::async_trait;

use crate::domain::{Attendee, Email, PhoneNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by attendee repository adapters.
    pub enum AttendeeRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "attendee repository connection failed: {message}",
        /// The store rejected or failed the request.
        Query { message: String } =>
            "attendee repository query failed: {message}",
    }
}

/// Lookup and insert operations over stored attendees.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    async fn find_by_email(&self, email: &Email)
    -> Result<Option<Attendee>, AttendeeRepositoryError>;

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError>;

    async fn insert(&self, attendee: &Attendee) -> Result<(), AttendeeRepositoryError>;
}
