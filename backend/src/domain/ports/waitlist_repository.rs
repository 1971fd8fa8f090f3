//! Driven port for waitlist persistence.

use async_trait::async_trait;

use crate::domain::{Email, PhoneNumber, WaitlistEntry};

use super::define_port_error;

define_port_error! {
    /// Errors raised by waitlist repository adapters.
    pub enum WaitlistRepositoryError {
        /// The backing store could not be reached.
        Connection { message: String } =>
            "waitlist repository connection failed: {message}",
        /// The store rejected or failed the request.
        Query { message: String } =>
            "waitlist repository query failed: {message}",
        /// A unique constraint rejected the insert.
        Duplicate { message: String } =>
            "waitlist entry already exists: {message}",
    }
}

/// Lookup and insert operations over stored waitlist signups.
///
/// Emails and phone numbers arrive normalised, so adapters compare them by
/// exact value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Fetch the signup registered with `email`, if any.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError>;

    /// Fetch the signup registered with `phone`, if any.
    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError>;

    /// Store a new signup.
    async fn insert(&self, entry: &WaitlistEntry) -> Result<(), WaitlistRepositoryError>;
}
