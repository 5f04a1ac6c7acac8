//! Receipt polling with a deadline and cooperative cancellation.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, sleep_until, timeout_at, Instant, MissedTickBehavior};

use crate::blockchain::{ChainError, ChainReader, ChainReceipt};
use crate::config::ConfirmationConfig;
use crate::lifecycle::Shutdown;

/// Errors from waiting on a receipt.
#[derive(Debug, Error)]
pub enum ConfirmError {
    /// No receipt appeared before the deadline.
    #[error("no receipt for {tx_hash} within {waited_ms} ms")]
    Timeout { tx_hash: TxHash, waited_ms: u64 },

    /// A receipt query failed for a reason other than "not found".
    #[error("receipt query for {tx_hash} failed: {source}")]
    Fetch {
        tx_hash: TxHash,
        #[source]
        source: ChainError,
    },

    /// Shutdown fired while waiting.
    #[error("wait for {0} cancelled")]
    Cancelled(TxHash),
}

/// Polls the node until a transaction receipt is available.
#[derive(Clone)]
pub struct ConfirmationWaiter {
    chain: Arc<dyn ChainReader>,
    poll_interval: Duration,
    default_timeout: Duration,
    shutdown: Shutdown,
}

impl ConfirmationWaiter {
    /// Create a waiter using the configured interval and default deadline.
    pub fn new(chain: Arc<dyn ChainReader>, config: &ConfirmationConfig, shutdown: Shutdown) -> Self {
        Self {
            chain,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            default_timeout: Duration::from_secs(config.timeout_secs),
            shutdown,
        }
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Deadline used by `await_default`.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Wait using the configured deadline.
    pub async fn await_default(&self, tx_hash: TxHash) -> Result<ChainReceipt, ConfirmError> {
        self.await_receipt(tx_hash, self.default_timeout).await
    }

    /// Wait until the receipt for `tx_hash` is found, `timeout` elapses, or
    /// shutdown fires.
    ///
    /// The first poll happens immediately, so a zero timeout performs exactly
    /// one poll. Both the wait between polls and each poll are bounded by the
    /// deadline.
    pub async fn await_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> Result<ChainReceipt, ConfirmError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown_rx = self.shutdown.subscribe();

        // First tick completes immediately.
        ticker.tick().await;

        loop {
            if self.shutdown.is_triggered() {
                return Err(ConfirmError::Cancelled(tx_hash));
            }

            let polled = tokio::select! {
                polled = timeout_at(deadline, self.chain.transaction_receipt(tx_hash)) => polled,
                _ = shutdown_rx.recv() => return Err(ConfirmError::Cancelled(tx_hash)),
            };

            match polled {
                Ok(Ok(Some(receipt))) => {
                    tracing::debug!(
                        tx_hash = %tx_hash,
                        success = receipt.success,
                        waited_ms = started.elapsed().as_millis() as u64,
                        "Receipt found"
                    );
                    return Ok(receipt);
                }
                Ok(Ok(None)) => {
                    tracing::trace!(tx_hash = %tx_hash, "Receipt not yet available");
                }
                Ok(Err(source)) => return Err(ConfirmError::Fetch { tx_hash, source }),
                Err(_) => return Err(timed_out(tx_hash, started)),
            }

            if Instant::now() >= deadline {
                return Err(timed_out(tx_hash, started));
            }

            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => return Err(ConfirmError::Cancelled(tx_hash)),
                _ = sleep_until(deadline) => return Err(timed_out(tx_hash, started)),
                _ = ticker.tick() => {}
            }
        }
    }
}

fn timed_out(tx_hash: TxHash, started: Instant) -> ConfirmError {
    ConfirmError::Timeout {
        tx_hash,
        waited_ms: started.elapsed().as_millis() as u64,
    }
}

impl std::fmt::Debug for ConfirmationWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationWaiter")
            .field("poll_interval", &self.poll_interval)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
