//! Attendee repository backed by the `attendees` table.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{Filter, SupabaseClient};
use super::dto::{ATTENDEES_TABLE, ContactRow};
use crate::domain::ports::{AttendeeRepository, AttendeeRepositoryError};
use crate::domain::{Attendee, Email, PhoneNumber};
use crate::outbound::http::RemoteError;

/// [`AttendeeRepository`] over the hosted REST table API.
#[derive(Clone)]
pub struct SupabaseAttendeeRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseAttendeeRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn find_one(&self, filter: Filter) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        let rows: Vec<ContactRow> = self
            .client
            .select(ATTENDEES_TABLE, &[filter], None)
            .await
            .map_err(map_remote_error)?;
        rows.into_iter()
            .next()
            .map(ContactRow::into_attendee)
            .transpose()
            .map_err(AttendeeRepositoryError::query)
    }
}

fn map_remote_error(error: RemoteError) -> AttendeeRepositoryError {
    if error.is_connectivity() {
        AttendeeRepositoryError::connection(error.to_string())
    } else {
        AttendeeRepositoryError::query(error.to_string())
    }
}

#[async_trait]
impl AttendeeRepository for SupabaseAttendeeRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        self.find_one(Filter::eq("email", email)).await
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<Attendee>, AttendeeRepositoryError> {
        self.find_one(Filter::eq("phone", phone)).await
    }

    async fn insert(&self, attendee: &Attendee) -> Result<(), AttendeeRepositoryError> {
        let _: Vec<ContactRow> = self
            .client
            .insert(ATTENDEES_TABLE, &ContactRow::from(attendee))
            .await
            .map_err(map_remote_error)?;
        Ok(())
    }
}
