//! Driving port for the checkout identify step.

use async_trait::async_trait;

use crate::domain::{ContactDetails, Error, Identification};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttendeeCommand: Send + Sync {
    /// Find or register the attendee with these contact details.
    async fn identify(&self, details: ContactDetails) -> Result<Identification, Error>;
}
