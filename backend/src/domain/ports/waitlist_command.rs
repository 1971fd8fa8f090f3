//! Driving port for waitlist signups.

use async_trait::async_trait;

use crate::domain::{ContactDetails, Error, WaitlistEntry};

/// Domain use-case port for joining the waitlist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaitlistCommand: Send + Sync {
    /// Register a new signup; duplicates and conflicting contacts are `409`.
    async fn join(&self, details: ContactDetails) -> Result<WaitlistEntry, Error>;
}
