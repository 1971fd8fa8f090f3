//! Minimal client for the hosted database's REST table API.
//!
//! The API exposes each table at `/rest/v1/{table}` and takes row filters as
//! query parameters of the form `column=eq.value`. This client owns the
//! transport details only; repositories decide which tables and columns to
//! touch.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use zeroize::Zeroizing;

use crate::outbound::http::{RemoteError, map_status_error, map_transport_error};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Row filter rendered as `column=eq.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column: &'static str,
    value: String,
}

impl Filter {
    /// Match rows whose `column` equals `value`.
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }

    fn query_pair(&self) -> (&'static str, String) {
        (self.column, format!("eq.{}", self.value))
    }
}

/// Connection settings for the hosted database and auth API.
#[derive(Clone)]
pub struct SupabaseSettings {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: Url,
    /// Service key sent as `apikey` and bearer token.
    pub service_key: Zeroizing<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// REST client shared by the table repositories and the auth adapter.
pub struct SupabaseClient {
    client: Client,
    base_url: Url,
    service_key: Zeroizing<String>,
}

impl SupabaseClient {
    /// Build a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(settings: SupabaseSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url,
            service_key: settings.service_key,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|err| RemoteError::rejected(format!("invalid endpoint {path}: {err}")))
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn table_url(&self, table: &str, filters: &[Filter]) -> Result<Url, RemoteError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        {
            let mut pairs = url.query_pairs_mut();
            for filter in filters {
                let (column, value) = filter.query_pair();
                pairs.append_pair(column, &value);
            }
        }
        Ok(url)
    }

    /// Select rows matching every filter, ordered by `order` when given.
    pub async fn select<T>(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&str>,
    ) -> Result<Vec<T>, RemoteError>
    where
        T: DeserializeOwned,
    {
        let mut url = self.table_url(table, filters)?;
        url.query_pairs_mut().append_pair("select", "*");
        if let Some(order) = order {
            url.query_pairs_mut().append_pair("order", order);
        }
        self.send(table, self.request(Method::GET, url)).await
    }

    /// Insert one row and return the stored representation.
    pub async fn insert<B, T>(&self, table: &str, row: &B) -> Result<Vec<T>, RemoteError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, &[])?;
        let request = self
            .request(Method::POST, url)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(row);
        self.send(table, request).await
    }

    /// Patch matching rows and return their updated representation.
    pub async fn update<B, T>(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &B,
    ) -> Result<Vec<T>, RemoteError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, filters)?;
        let request = self
            .request(Method::PATCH, url)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(patch);
        self.send(table, request).await
    }

    /// Delete matching rows and return what was removed.
    pub async fn delete<T>(&self, table: &str, filters: &[Filter]) -> Result<Vec<T>, RemoteError>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table, filters)?;
        let request = self
            .request(Method::DELETE, url)
            .header("Prefer", PREFER_REPRESENTATION);
        self.send(table, request).await
    }

    async fn send<T>(&self, table: &str, request: RequestBuilder) -> Result<Vec<T>, RemoteError>
    where
        T: DeserializeOwned,
    {
        let body = execute(request).await.inspect_err(|err| {
            warn!(table, error = %err, "table request failed");
        })?;
        serde_json::from_slice(&body).map_err(|err| {
            warn!(table, error = %err, "table response did not decode");
            RemoteError::decode(format!("{table}: {err}"))
        })
    }
}

/// Send a request and return the body of a successful response.
pub(crate) async fn execute(request: RequestBuilder) -> Result<Vec<u8>, RemoteError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> SupabaseClient {
        SupabaseClient::new(SupabaseSettings {
            base_url: Url::parse("https://project.supabase.test/").expect("url"),
            service_key: Zeroizing::new("service-key".to_owned()),
            timeout: Duration::from_secs(5),
        })
        .expect("client")
    }

    #[rstest]
    fn filters_render_as_eq_operators(client: SupabaseClient) {
        let url = client
            .table_url(
                "waitlist",
                &[
                    Filter::eq("email", "ada@example.com"),
                    Filter::eq("phone", "+14155550100"),
                ],
            )
            .expect("url");
        assert_eq!(url.path(), "/rest/v1/waitlist");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("email".to_owned(), "eq.ada@example.com".to_owned()),
                ("phone".to_owned(), "eq.+14155550100".to_owned()),
            ]
        );
    }

    #[rstest]
    fn filter_values_are_query_encoded(client: SupabaseClient) {
        let url = client
            .table_url("tickets", &[Filter::eq("payment_intent_id", "pi_1&select=x")])
            .expect("url");
        assert_eq!(url.query(), Some("payment_intent_id=eq.pi_1%26select%3Dx"));
    }

    #[rstest]
    fn requests_carry_service_key(client: SupabaseClient) {
        let url = client.endpoint("rest/v1/events").expect("url");
        let request = client
            .request(Method::GET, url)
            .build()
            .expect("request");
        let headers = request.headers();
        assert_eq!(
            headers.get("apikey").and_then(|v| v.to_str().ok()),
            Some("service-key")
        );
        assert_eq!(
            headers
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer service-key")
        );
    }
}
