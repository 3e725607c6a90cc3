// Persistence seam for bill records and its HTTP implementation against the
// bills REST API.
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use shared::BillRecord;

use crate::error::{EngineError, Result};

pub const BILLS_PATH: &str = "/api/bills";

#[async_trait]
pub trait BillStore: Send + Sync {
    async fn list(&self) -> Result<Vec<BillRecord>>;

    /// Stores a new record and returns it as stored (with its identifier).
    async fn create(&self, record: &BillRecord) -> Result<BillRecord>;

    /// Deleting an identifier the store does not know is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Talks to `GET/POST /api/bills` and `DELETE /api/bills/{id}`. One request
/// per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpBillStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl HttpBillStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bills_url(&self) -> String {
        format!("{}{}", self.base_url, BILLS_PATH)
    }

    /// The id is pushed as one path segment, so `/`, `?` and `#` in it are
    /// percent-encoded.
    fn bill_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.bills_url())
            .map_err(|e| EngineError::ConfigError(format!("invalid bills API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| EngineError::ConfigError(format!("bills API URL '{}' cannot take a path", self.base_url)))?
            .push(id);
        Ok(url)
    }

    /// Turns a non-success response into a persistence error, preferring the
    /// server's `message` field over the bare status text.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::error!(status = status.as_u16(), message = %message, "Bills API request failed");
        Err(EngineError::PersistenceError {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl BillStore for HttpBillStore {
    async fn list(&self) -> Result<Vec<BillRecord>> {
        tracing::debug!(url = %self.bills_url(), "Fetching bills");
        let response = self.client.get(self.bills_url()).send().await?;
        let bills: Vec<BillRecord> = Self::check(response).await?.json().await?;
        tracing::info!(count = bills.len(), "Fetched bill history");
        Ok(bills)
    }

    async fn create(&self, record: &BillRecord) -> Result<BillRecord> {
        tracing::debug!(url = %self.bills_url(), month = %record.month, "Saving bill");
        let response = self.client.post(self.bills_url()).json(record).send().await?;
        let stored: BillRecord = Self::check(response).await?.json().await?;
        tracing::info!(id = ?stored.id, month = %stored.month, "Bill saved");
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.bill_url(id)?;
        tracing::debug!(url = %url, "Deleting bill");
        let response = self.client.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::warn!(id = %id, "Bill already absent on delete");
            return Ok(());
        }
        Self::check(response).await?;
        tracing::info!(id = %id, "Bill deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_url_encodes_id_as_one_segment() {
        let store = HttpBillStore::new("http://localhost:5000/");
        assert_eq!(store.bill_url("a1").unwrap().as_str(), "http://localhost:5000/api/bills/a1");
        assert_eq!(
            store.bill_url("a/b?c#d").unwrap().as_str(),
            "http://localhost:5000/api/bills/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_bill_url_rejects_invalid_base() {
        let store = HttpBillStore::new("not a url");
        assert!(matches!(store.bill_url("a1"), Err(EngineError::ConfigError(_))));
    }
}
