//! poller/mod.rs
//!
//! The polling state machine that owns the fetch lifecycle.
//!
//! Lifecycle: `spawn` enters the loading state and issues the first fetch
//! immediately; thereafter a fixed-interval ticker drives refresh cycles
//! until the handle is shut down. Each cycle obtains a bearer token, fetches
//! one batch, normalizes it, and publishes the new timeline only when its
//! fingerprint differs from the last accepted one - an unchanged fingerprint
//! leaves the published `Arc` untouched so downstream consumers re-render
//! nothing.
//!
//! A fetch that fails with the 401/"too early" clock-skew condition is
//! retried exactly once after a fixed delay, with a fresh token. Any other
//! failure (or a failed retry) becomes the cycle's error; the schedule
//! itself continues regardless.
//!
//! Cycles run to completion before the next tick is taken, so two fetches
//! are never in flight at once and a slow response can never overwrite a
//! newer one. Cancellation is checked at every await point and once more
//! before publication: a cycle that loses the race to teardown mutates
//! nothing.
//!
//! Changing the identity, limit or interval means shutting the handle down
//! and spawning a fresh poller; all per-instance state (fingerprint, loading
//! flag, error) starts clean.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::fetch::{RecordSource, TokenProvider};
use crate::normalize::normalize_response;
use crate::snapshot::fingerprint;
use crate::types::{Timeline, VitalRecord};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(15_000);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(3_000);
pub const DEFAULT_FETCH_LIMIT: u32 = 1_000;

/// Tunables for one poller instance.
#[derive(Clone, Debug)]
pub struct PollerConfig {
    /// Maximum records requested per fetch.
    pub limit: u32,
    /// Fixed refresh interval.
    pub poll_interval: Duration,
    /// Delay before the single clock-skew retry.
    pub retry_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FETCH_LIMIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Consumer-visible fetch state.
#[derive(Clone, Debug)]
pub struct PollStatus {
    /// True only until the very first cycle resolves, success or failure.
    pub loading: bool,
    /// Detail of the most recent failed cycle; cleared when the next cycle
    /// starts.
    pub last_error: Option<String>,
}

struct Published {
    timeline: Timeline,
    status: PollStatus,
}

/// Builder for a polling worker.
pub struct Poller {
    config: PollerConfig,
    source: Arc<dyn RecordSource>,
    tokens: Arc<dyn TokenProvider>,
}

impl Poller {
    pub fn new(source: Arc<dyn RecordSource>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            config: PollerConfig::default(),
            source,
            tokens,
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Start the worker. The first fetch is issued immediately.
    pub fn spawn(self) -> PollerHandle {
        let shared = Arc::new(RwLock::new(Published {
            timeline: Arc::new(Vec::new()),
            status: PollStatus {
                loading: true,
                last_error: None,
            },
        }));
        let cancel = CancellationToken::new();

        let worker = tokio::spawn(run_loop(
            self.config,
            self.source,
            self.tokens,
            shared.clone(),
            cancel.clone(),
        ));

        PollerHandle {
            shared,
            cancel,
            worker: Some(worker),
        }
    }
}

/// Owner of a running poller. Dropping the handle cancels the worker;
/// `shutdown` additionally waits for it to wind down.
pub struct PollerHandle {
    shared: Arc<RwLock<Published>>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// The currently published timeline. Cheap: clones the `Arc`, not the
    /// records.
    pub async fn timeline(&self) -> Timeline {
        self.shared.read().await.timeline.clone()
    }

    pub async fn status(&self) -> PollStatus {
        self.shared.read().await.status.clone()
    }

    /// Cancel the schedule and any in-flight cycle, then wait for the
    /// worker to exit. In-flight results are discarded, not applied.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_loop(
    config: PollerConfig,
    source: Arc<dyn RecordSource>,
    tokens: Arc<dyn TokenProvider>,
    shared: Arc<RwLock<Published>>,
    cancel: CancellationToken,
) {
    let mut last_fingerprint = String::new();
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&config, &*source, &*tokens, &shared, &cancel, &mut last_fingerprint)
                    .await;
            }
            _ = cancel.cancelled() => {
                log::debug!("poller shutting down");
                break;
            }
        }
    }
}

/// One fetch cycle: clear the previous error, fetch (with the bounded skew
/// retry), and publish if the fingerprint moved.
async fn run_cycle(
    config: &PollerConfig,
    source: &dyn RecordSource,
    tokens: &dyn TokenProvider,
    shared: &RwLock<Published>,
    cancel: &CancellationToken,
    last_fingerprint: &mut String,
) {
    {
        let mut state = shared.write().await;
        state.status.last_error = None;
    }

    let outcome = tokio::select! {
        outcome = fetch_batch(config, source, tokens) => outcome,
        _ = cancel.cancelled() => return,
    };

    // Teardown may have won the race after the fetch resolved; publish
    // nothing in that case.
    if cancel.is_cancelled() {
        return;
    }

    let mut state = shared.write().await;
    match outcome {
        Ok(batch) => {
            let new_fingerprint = fingerprint(&batch);
            if new_fingerprint != *last_fingerprint {
                log::debug!("publishing {} records", batch.len());
                *last_fingerprint = new_fingerprint;
                state.timeline = Arc::new(batch);
            } else {
                log::trace!("batch unchanged, keeping published timeline");
            }
        }
        Err(err) => {
            log::warn!("record fetch failed: {err}");
            state.status.last_error = Some(err.to_string());
        }
    }
    state.status.loading = false;
}

/// Fetch and normalize one batch, retrying exactly once on the transient
/// auth clock-skew failure.
async fn fetch_batch(
    config: &PollerConfig,
    source: &dyn RecordSource,
    tokens: &dyn TokenProvider,
) -> Result<Vec<VitalRecord>, FetchError> {
    let token = tokens.bearer_token().await?;
    match source.fetch(&token, config.limit).await {
        Ok(body) => Ok(normalize_response(&body)),
        Err(err) if err.is_auth_skew() => {
            log::info!(
                "token not yet valid, retrying once in {:?}",
                config.retry_delay
            );
            tokio::time::sleep(config.retry_delay).await;
            let fresh = tokens.bearer_token().await?;
            let body = source.fetch(&fresh, config.limit).await?;
            Ok(normalize_response(&body))
        }
        Err(err) => Err(err),
    }
}
