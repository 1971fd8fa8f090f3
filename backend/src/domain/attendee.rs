//! Attendee identification for the ticket checkout.
//!
//! The checkout's "identify" step either finds the returning attendee or
//! registers a new one. The same email/phone matching rules as the waitlist
//! apply, except that an exact match is a success rather than a duplicate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::ports::{AttendeeCommand, AttendeeRepository, AttendeeRepositoryError};
use super::{
    ContactDetails, ContactRecord, Email, Error, IdentityMatch, PersonName, PhoneNumber,
    match_identity,
};

/// A person who has identified themselves during checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub id: Uuid,
    pub name: PersonName,
    pub email: Email,
    pub phone: PhoneNumber,
    pub created_at: DateTime<Utc>,
}

impl ContactRecord for Attendee {
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

/// Result of the identify step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub attendee: Attendee,
    /// `true` when the attendee was already known.
    pub existing: bool,
}

/// Attendee service implementing [`AttendeeCommand`].
#[derive(Clone)]
pub struct AttendeeService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> AttendeeService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

fn map_repository_error(error: AttendeeRepositoryError) -> Error {
    match error {
        AttendeeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("attendee store unavailable: {message}"))
        }
        AttendeeRepositoryError::Query { message } => {
            Error::internal(format!("attendee store error: {message}"))
        }
    }
}

#[async_trait]
impl<R: ?Sized> AttendeeCommand for AttendeeService<R>
where
    R: AttendeeRepository,
{
    async fn identify(&self, details: ContactDetails) -> Result<Identification, Error> {
        let by_email = self
            .repo
            .find_by_email(&details.email)
            .await
            .map_err(map_repository_error)?;
        let by_phone = self
            .repo
            .find_by_phone(&details.phone)
            .await
            .map_err(map_repository_error)?;

        match match_identity(by_email, by_phone, &details.email, &details.phone) {
            IdentityMatch::Existing(attendee) => Ok(Identification {
                attendee,
                existing: true,
            }),
            IdentityMatch::EmailTakenWithDifferentPhone(_) => Err(Error::conflict(
                "this email is registered with a different phone number",
            )
            .with_details(json!({ "field": "phone", "code": "phone_mismatch" }))),
            IdentityMatch::PhoneTakenWithDifferentEmail(_) => Err(Error::conflict(
                "this phone number is registered with a different email",
            )
            .with_details(json!({ "field": "email", "code": "email_mismatch" }))),
            IdentityMatch::Split { .. } => Err(Error::conflict(
                "this email and phone number belong to different attendees",
            )
            .with_details(json!({ "code": "identity_conflict" }))),
            IdentityMatch::New => {
                let attendee = Attendee {
                    id: Uuid::new_v4(),
                    name: details.name,
                    email: details.email,
                    phone: details.phone,
                    created_at: self.clock.utc(),
                };
                self.repo
                    .insert(&attendee)
                    .await
                    .map_err(map_repository_error)?;
                info!(attendee_id = %attendee.id, "attendee registered");
                Ok(Identification {
                    attendee,
                    existing: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockAttendeeRepository;
    use crate::domain::test_clock::fixture_clock;
    use rstest::rstest;

    fn details() -> ContactDetails {
        ContactDetails::try_from_parts("Ada Lovelace", "ada@example.com", "4155550100")
            .expect("valid contact")
    }

    fn stored(email: &str, phone: &str) -> Attendee {
        Attendee {
            id: Uuid::new_v4(),
            name: PersonName::new("Ada").expect("name"),
            email: Email::new(email).expect("email"),
            phone: PhoneNumber::new(phone).expect("phone"),
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn returning_attendee_is_not_reinserted() {
        let known = stored("ada@example.com", "4155550100");
        let expected_id = known.id;
        let mut repo = MockAttendeeRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_| Ok(Some(known)));
        repo.expect_find_by_phone().return_once(|_| Ok(None));
        repo.expect_insert().never();

        let service = AttendeeService::new(Arc::new(repo), fixture_clock());
        let result = service.identify(details()).await.expect("identify");
        assert!(result.existing);
        assert_eq!(result.attendee.id, expected_id);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_attendee_is_registered() {
        let mut repo = MockAttendeeRepository::new();
        repo.expect_find_by_email().return_once(|_| Ok(None));
        repo.expect_find_by_phone().return_once(|_| Ok(None));
        repo.expect_insert().times(1).return_once(|_| Ok(()));

        let service = AttendeeService::new(Arc::new(repo), fixture_clock());
        let result = service.identify(details()).await.expect("identify");
        assert!(!result.existing);
        assert_eq!(result.attendee.phone.as_ref(), "4155550100");
    }

    #[rstest]
    #[tokio::test]
    async fn split_identity_is_a_conflict() {
        let first = stored("ada@example.com", "4155550111");
        let second = stored("grace@example.com", "4155550100");
        let mut repo = MockAttendeeRepository::new();
        repo.expect_find_by_email()
            .return_once(move |_| Ok(Some(first)));
        repo.expect_find_by_phone()
            .return_once(move |_| Ok(Some(second)));
        repo.expect_insert().never();

        let service = AttendeeService::new(Arc::new(repo), fixture_clock());
        let err = service.identify(details()).await.expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
        let code = err
            .details()
            .and_then(|value| value.get("code"))
            .and_then(|value| value.as_str());
        assert_eq!(code, Some("identity_conflict"));
    }
}
