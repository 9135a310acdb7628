//! fetch/mod.rs
//!
//! The seams between the poller and the outside world: an identity provider
//! that hands out bearer tokens, and a record source that fetches one batch
//! of raw records. Both are traits so the state machine can be driven by
//! scripted fakes in tests and by HTTP in production.

mod http;

pub use http::HttpRecordSource;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// "Get current bearer token" - the only operation consumed from the
/// identity provider. Called once per fetch attempt, twice when the
/// clock-skew retry fires (the retry always takes a fresh token).
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, FetchError>;
}

/// One batch of raw records, at most `limit` of them, authorized by
/// `token`. The body is returned undecoded as JSON; normalization happens
/// in the poller so every source shares the same tolerant path.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, token: &str, limit: u32) -> Result<Value, FetchError>;
}
