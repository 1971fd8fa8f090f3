//! Pre-launch waitlist signups.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::ports::{WaitlistCommand, WaitlistRepository, WaitlistRepositoryError};
use super::{
    ContactDetails, ContactRecord, Email, Error, IdentityMatch, PersonName, PhoneNumber,
    match_identity,
};

/// Message returned to the client after a successful signup.
pub const WAITLIST_JOINED_MESSAGE: &str = "You're on the waitlist!";

/// A stored waitlist signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub name: PersonName,
    pub email: Email,
    pub phone: PhoneNumber,
    pub created_at: DateTime<Utc>,
}

impl ContactRecord for WaitlistEntry {
    fn record_key(&self) -> String {
        self.id.to_string()
    }

    fn email(&self) -> &Email {
        &self.email
    }

    fn phone(&self) -> &PhoneNumber {
        &self.phone
    }
}

/// Waitlist service implementing [`WaitlistCommand`].
#[derive(Clone)]
pub struct WaitlistService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> WaitlistService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R: ?Sized> WaitlistService<R>
where
    R: WaitlistRepository,
{
    fn map_repository_error(error: WaitlistRepositoryError) -> Error {
        match error {
            WaitlistRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("waitlist store unavailable: {message}"))
            }
            WaitlistRepositoryError::Query { message } => {
                Error::internal(format!("waitlist store error: {message}"))
            }
            WaitlistRepositoryError::Duplicate { .. } => already_registered(),
        }
    }
}

fn already_registered() -> Error {
    Error::conflict("this email is already on the waitlist")
        .with_details(json!({ "code": "already_registered" }))
}

#[async_trait]
impl<R: ?Sized> WaitlistCommand for WaitlistService<R>
where
    R: WaitlistRepository,
{
    async fn join(&self, details: ContactDetails) -> Result<WaitlistEntry, Error> {
        let by_email = self
            .repo
            .find_by_email(&details.email)
            .await
            .map_err(Self::map_repository_error)?;
        let by_phone = self
            .repo
            .find_by_phone(&details.phone)
            .await
            .map_err(Self::map_repository_error)?;

        match match_identity(by_email, by_phone, &details.email, &details.phone) {
            IdentityMatch::New => {}
            IdentityMatch::Existing(_) => return Err(already_registered()),
            IdentityMatch::EmailTakenWithDifferentPhone(_) => {
                return Err(Error::conflict(
                    "this email is already on the waitlist with a different phone number",
                )
                .with_details(json!({ "field": "phone", "code": "phone_mismatch" })));
            }
            IdentityMatch::PhoneTakenWithDifferentEmail(_) => {
                return Err(Error::conflict(
                    "this phone number is already on the waitlist with a different email",
                )
                .with_details(json!({ "field": "email", "code": "email_mismatch" })));
            }
            IdentityMatch::Split { .. } => {
                return Err(Error::conflict(
                    "this email and phone number belong to different signups",
                )
                .with_details(json!({ "code": "identity_conflict" })));
            }
        }

        let entry = WaitlistEntry {
            id: Uuid::new_v4(),
            name: details.name,
            email: details.email,
            phone: details.phone,
            created_at: self.clock.utc(),
        };
        self.repo
            .insert(&entry)
            .await
            .map_err(Self::map_repository_error)?;
        info!(entry_id = %entry.id, "waitlist signup stored");
        Ok(entry)
    }
}
