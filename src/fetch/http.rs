//! fetch/http.rs
//!
//! The production `RecordSource`: `GET {base_url}/api/records/` with a
//! bearer token and a `limit` query parameter.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

use super::RecordSource;

const RECORDS_PATH: &str = "/api/records/";

/// HTTP record source backed by a shared `reqwest` client.
pub struct HttpRecordSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecordSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, extra headers).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch(&self, token: &str, limit: u32) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, RECORDS_PATH);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail: extract_detail(body),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Pull the human-readable message out of a `{"detail": ...}` error body,
/// falling back to the raw text.
fn extract_detail(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => match value.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body,
        },
        Err(_) => body,
    }
}
