//! Background ingestion of `PersonInfoUpdated` events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::sleep;

use crate::config::IngestConfig;
use crate::contract::{PersonInfoUpdate, PersonRegistry};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::backoff::reconnect_delay;
use crate::store::{EventStore, PersonInfoEvent};

/// Why the ingestor stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown fired.
    Cancelled,
    /// The subscription kept failing after every allowed reconnect.
    SubscriptionFailed(String),
    /// Ingestion is switched off in configuration.
    Disabled,
}

/// Streams contract events into the event store until cancelled.
pub struct EventIngestor {
    registry: Arc<dyn PersonRegistry>,
    store: Arc<dyn EventStore>,
    config: IngestConfig,
    running: Arc<AtomicBool>,
}

impl EventIngestor {
    pub fn new(
        registry: Arc<dyn PersonRegistry>,
        store: Arc<dyn EventStore>,
        config: IngestConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether `run` is currently in its Running state.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Shared flag mirroring `is_running`, for observers outside the task.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Run until `shutdown` fires or reconnect attempts are exhausted.
    pub async fn run(&self, shutdown: Shutdown) -> StopReason {
        if !self.config.enabled {
            tracing::info!("Event ingestion disabled");
            return StopReason::Disabled;
        }

        self.running.store(true, Ordering::SeqCst);
        let reason = self.run_loop(&shutdown).await;
        self.running.store(false, Ordering::SeqCst);

        match &reason {
            StopReason::SubscriptionFailed(error) => {
                tracing::error!(error = %error, "Event ingestor stopped: subscription failed")
            }
            other => tracing::info!(reason = ?other, "Event ingestor stopped"),
        }
        reason
    }

    async fn run_loop(&self, shutdown: &Shutdown) -> StopReason {
        let mut failures: u32 = 0;

        loop {
            if shutdown.is_triggered() {
                return StopReason::Cancelled;
            }

            let opened = tokio::select! {
                opened = self.registry.subscribe_person_info_updated() => opened,
                _ = shutdown.triggered() => return StopReason::Cancelled,
            };

            let failure = match opened {
                Ok(mut subscription) => {
                    tracing::info!("Listening for PersonInfoUpdated events");
                    loop {
                        let next = tokio::select! {
                            item = subscription.next() => Some(item),
                            _ = shutdown.triggered() => None,
                        };
                        let Some(item) = next else {
                            subscription.unsubscribe();
                            return StopReason::Cancelled;
                        };

                        match item {
                            Some(Ok(update)) => {
                                self.ingest(update).await;
                                failures = 0;
                            }
                            Some(Err(e)) => break e.to_string(),
                            None => break "event stream ended".to_string(),
                        }
                    }
                }
                Err(e) => e.to_string(),
            };

            metrics::record_event("subscription_failed");
            failures += 1;
            if failures > self.config.max_reconnect_attempts {
                return StopReason::SubscriptionFailed(failure);
            }

            let delay = reconnect_delay(failures, &self.config);
            tracing::warn!(
                error = %failure,
                attempt = failures,
                max_attempts = self.config.max_reconnect_attempts,
                delay_ms = delay.as_millis() as u64,
                "Event subscription failed, reconnecting"
            );

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.triggered() => return StopReason::Cancelled,
            }
        }
    }

    async fn ingest(&self, update: PersonInfoUpdate) {
        let index = update.index;
        let event = PersonInfoEvent {
            id: 0,
            person_index: update.index,
            person_name: update.name,
            person_age: update.age,
            transaction_hash: format!("{:#x}", update.transaction_hash),
        };

        match self.store.insert(event).await {
            Ok(stored) => {
                metrics::record_event("stored");
                tracing::info!(index, id = stored.id, name = %stored.person_name, "Stored person info event");
            }
            Err(e) if e.is_duplicate() => {
                metrics::record_event("duplicate");
                tracing::debug!(index, "Event already stored");
            }
            Err(e) => {
                metrics::record_event("store_error");
                tracing::error!(index, error = %e, "Failed to store event");
            }
        }
    }
}
