//! Waitlist repository backed by the `waitlist` table.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{Filter, SupabaseClient};
use super::dto::{ContactRow, WAITLIST_TABLE};
use crate::domain::ports::{WaitlistRepository, WaitlistRepositoryError};
use crate::domain::{Email, PhoneNumber, WaitlistEntry};
use crate::outbound::http::RemoteError;

/// [`WaitlistRepository`] over the hosted REST table API.
#[derive(Clone)]
pub struct SupabaseWaitlistRepository {
    client: Arc<SupabaseClient>,
}

impl SupabaseWaitlistRepository {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn find_one(
        &self,
        filter: Filter,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        let rows: Vec<ContactRow> = self
            .client
            .select(WAITLIST_TABLE, &[filter], None)
            .await
            .map_err(map_remote_error)?;
        rows.into_iter()
            .next()
            .map(ContactRow::into_waitlist_entry)
            .transpose()
            .map_err(WaitlistRepositoryError::query)
    }
}

fn map_remote_error(error: RemoteError) -> WaitlistRepositoryError {
    match error {
        RemoteError::Conflict { message } => WaitlistRepositoryError::duplicate(message),
        other if other.is_connectivity() => WaitlistRepositoryError::connection(other.to_string()),
        other => WaitlistRepositoryError::query(other.to_string()),
    }
}

#[async_trait]
impl WaitlistRepository for SupabaseWaitlistRepository {
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        self.find_one(Filter::eq("email", email)).await
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<WaitlistEntry>, WaitlistRepositoryError> {
        self.find_one(Filter::eq("phone", phone)).await
    }

    async fn insert(&self, entry: &WaitlistEntry) -> Result<(), WaitlistRepositoryError> {
        let _: Vec<ContactRow> = self
            .client
            .insert(WAITLIST_TABLE, &ContactRow::from(entry))
            .await
            .map_err(map_remote_error)?;
        Ok(())
    }
}
