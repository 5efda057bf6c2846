//! Partitioned, rate-limited request gateway.
//!
//! Every call goes through a per-partition FIFO drained by a single dispatch
//! loop. Before each network attempt the loop waits on the partition's
//! [`QuotaTracker`] and records the dispatch; 429 responses are retried
//! according to the [`RetryPolicy`]. Partitions share nothing, so callers on
//! different partitions never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use super::outcome::ApiOutcome;
use super::queue::RequestQueue;
use super::quota::{QuotaLimits, QuotaTracker};
use super::retry::{RetryDecision, RetryPolicy};
use super::transport::{Transport, TransportError};

/// Faults that are not a normal [`ApiOutcome`].
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Transport failure on {partition}: {source}")]
    Transport {
        partition: String,
        #[source]
        source: TransportError,
    },

    #[error("Undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Rate limited on {partition}: gave up after {attempts} attempts")]
    RetriesExhausted { partition: String, attempts: u32 },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Dispatch loop for {0} dropped the request")]
    Dropped(String),
}

/// Gateway tuning.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub limits: QuotaLimits,
    pub retry: RetryPolicy,
    /// Applied to [`Gateway::request`]; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

type Reply = oneshot::Sender<Result<ApiOutcome, GatewayError>>;

struct QueuedRequest {
    path: String,
    reply: Reply,
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    config: GatewayConfig,
    quotas: Mutex<HashMap<String, QuotaTracker>>,
    queue: RequestQueue<QueuedRequest>,
}

/// Handle to the process-wide gateway. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, config: GatewayConfig) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                config,
                quotas: Mutex::new(HashMap::new()),
                queue: RequestQueue::new(),
            }),
        }
    }

    /// Perform one logical request on a partition.
    ///
    /// Resolves once the request has been dispatched (possibly several times
    /// on 429) and classified. Throttling never escapes: either a later
    /// attempt succeeds or the call fails with
    /// [`GatewayError::RetriesExhausted`].
    pub async fn request(&self, path: &str, partition: &str) -> Result<ApiOutcome, GatewayError> {
        match self.inner.config.request_timeout {
            Some(timeout) => self.request_with_timeout(path, partition, timeout).await,
            None => self.submit(path, partition).await,
        }
    }

    /// Like [`Gateway::request`] with an explicit deadline.
    ///
    /// On timeout the caller stops waiting but the task stays queued; the
    /// dispatch loop sees the abandoned reply channel and skips the network
    /// attempt when it reaches it.
    pub async fn request_with_timeout(
        &self,
        path: &str,
        partition: &str,
        timeout: Duration,
    ) -> Result<ApiOutcome, GatewayError> {
        tokio::time::timeout(timeout, self.submit(path, partition))
            .await
            .map_err(|_| GatewayError::Timeout(timeout))?
    }

    /// Current wait before the partition may dispatch again.
    pub async fn time_until_allowed(&self, partition: &str) -> Duration {
        let mut quotas = self.inner.quotas.lock().await;
        match quotas.get_mut(partition) {
            Some(tracker) => tracker.time_until_allowed(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Requests waiting behind the one in flight on a partition.
    pub async fn pending(&self, partition: &str) -> usize {
        self.inner.queue.pending(partition).await
    }

    async fn submit(&self, path: &str, partition: &str) -> Result<ApiOutcome, GatewayError> {
        let (reply, receiver) = oneshot::channel();
        let request = QueuedRequest {
            path: path.to_string(),
            reply,
        };

        if self.inner.queue.push(partition, request).await {
            let gateway = self.clone();
            let partition = partition.to_string();
            tokio::spawn(async move { gateway.drain(partition).await });
        }

        receiver
            .await
            .map_err(|_| GatewayError::Dropped(partition.to_string()))?
    }

    /// The single dispatch loop of a partition.
    async fn drain(&self, partition: String) {
        debug!(
            partition = %partition,
            transport = self.inner.transport.name(),
            "dispatch loop started"
        );
        while let Some(request) = self.inner.queue.pop(&partition).await {
            if request.reply.is_closed() {
                debug!(partition = %partition, path = %request.path, "caller gone, skipping");
                continue;
            }
            let result = self.execute(&partition, &request.path, &request.reply).await;
            // The caller may have timed out while we were waiting on the network.
            let _ = request.reply.send(result);
        }
        debug!(partition = %partition, "dispatch loop idle");
    }

    async fn execute(
        &self,
        partition: &str,
        path: &str,
        reply: &Reply,
    ) -> Result<ApiOutcome, GatewayError> {
        let mut attempt = 0;
        loop {
            if !self.acquire(partition, reply).await {
                debug!(partition, path, "caller gone while waiting for quota");
                return Err(GatewayError::Dropped(partition.to_string()));
            }
            attempt += 1;

            let response = self
                .inner
                .transport
                .send(partition, path)
                .await
                .map_err(|source| GatewayError::Transport {
                    partition: partition.to_string(),
                    source,
                })?;
            let outcome = ApiOutcome::from_response(&response)?;

            match self.inner.config.retry.decide(attempt, &outcome) {
                RetryDecision::Retry { delay } => {
                    let ceiling = self.inner.config.limits.long_window;
                    let delay = if delay > ceiling {
                        warn!(
                            partition,
                            path,
                            requested_ms = delay.as_millis() as u64,
                            ceiling_ms = ceiling.as_millis() as u64,
                            "Retry-After beyond the long window, clamping"
                        );
                        ceiling
                    } else {
                        delay
                    };
                    warn!(
                        partition,
                        path,
                        attempt,
                        wait_ms = delay.as_millis() as u64,
                        "Rate limited, waiting before retry"
                    );
                    sleep(delay).await;
                }
                RetryDecision::Stop => {
                    if let ApiOutcome::RateLimited { .. } = outcome {
                        warn!(partition, path, attempt, "Rate limit retries exhausted");
                        return Err(GatewayError::RetriesExhausted {
                            partition: partition.to_string(),
                            attempts: attempt,
                        });
                    }
                    return Ok(outcome);
                }
            }
        }
    }

    /// Wait until both windows admit a request, then record the dispatch.
    ///
    /// Returns `false` without consuming quota if the caller abandoned the
    /// request in the meantime.
    async fn acquire(&self, partition: &str, reply: &Reply) -> bool {
        loop {
            let wait = {
                let mut quotas = self.inner.quotas.lock().await;
                let tracker = quotas
                    .entry(partition.to_string())
                    .or_insert_with(|| QuotaTracker::new(self.inner.config.limits));
                let now = Instant::now();
                let wait = tracker.time_until_allowed(now);
                if wait.is_zero() {
                    if reply.is_closed() {
                        return false;
                    }
                    tracker.record_dispatch(now);
                }
                wait
            };

            if wait.is_zero() {
                return true;
            }
            debug!(partition, wait_ms = wait.as_millis() as u64, "Quota saturated");
            sleep(wait).await;
        }
    }
}
