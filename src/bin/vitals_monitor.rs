// src/bin/vitals_monitor.rs
//! Terminal monitor that polls a records backend and prints windowed vitals.
//!
//! Usage:
//!   VITALFEED_TOKEN=<bearer> vitals_monitor <base-url> [trailing-hours]
//!
//! The token is re-read from the environment on every attempt, so a wrapper
//! refreshing the variable keeps long runs authorized.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use vitalfeed::error::FetchError;
use vitalfeed::fetch::{HttpRecordSource, TokenProvider};
use vitalfeed::{summarize, Poller, WindowSpec};

const TOKEN_VAR: &str = "VITALFEED_TOKEN";

/// Identity provider backed by a pre-issued token in the environment.
struct EnvTokenProvider;

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn bearer_token(&self) -> Result<String, FetchError> {
        std::env::var(TOKEN_VAR).map_err(|_| FetchError::Token(format!("{TOKEN_VAR} is not set")))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let base_url = match std::env::args().nth(1) {
        Some(url) => url,
        None => bail!("usage: vitals_monitor <base-url> [trailing-hours]"),
    };
    let trailing_hours = std::env::args().nth(2).and_then(|arg| arg.parse::<f64>().ok());
    let window = WindowSpec::from_params(trailing_hours, None);

    let source = Arc::new(HttpRecordSource::new(base_url));
    let handle = Poller::new(source, Arc::new(EnvTokenProvider)).spawn();
    log::info!("polling started; press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(15)) => {
                print_summary(&handle, &window).await;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("stopping");
                handle.shutdown().await;
                return Ok(());
            }
        }
    }
}

async fn print_summary(handle: &vitalfeed::PollerHandle, window: &WindowSpec) {
    let status = handle.status().await;
    if status.loading {
        println!("waiting for first fetch...");
        return;
    }
    if let Some(err) = &status.last_error {
        log::warn!("last fetch failed: {err}");
    }

    let timeline = handle.timeline().await;
    let now_ms = chrono::Utc::now().timestamp_millis();
    let summary = summarize(&window.filter(&timeline, now_ms));
    match (summary.avg_heart_rate, summary.avg_spo2) {
        (Some(bpm), Some(spo2)) => println!(
            "{} samples | avg {} BPM | avg {:.1}% SpO2",
            summary.count, bpm, spo2
        ),
        _ => println!("no samples in window"),
    }
}
