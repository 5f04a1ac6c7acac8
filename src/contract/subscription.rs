//! Live `PersonInfoUpdated` event stream.

use alloy::rpc::types::Log;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::blockchain::{ChainError, ChainResult, LogSubscription};
use crate::contract::abi::PersonInfoUpdated;
use crate::contract::types::{to_u64, ContractError, ContractResult, PersonInfoUpdate};

/// Raw log stream feeding a subscription.
#[async_trait]
pub(crate) trait LogSource: Send + 'static {
    async fn recv(&mut self) -> ChainResult<Log>;
}

#[async_trait]
impl LogSource for LogSubscription {
    async fn recv(&mut self) -> ChainResult<Log> {
        LogSubscription::recv(self).await
    }
}

/// Buffered decoded events between the forwarder task and the consumer.
const SUBSCRIPTION_BUFFER: usize = 256;

/// Infinite, non-restartable sequence of decoded `PersonInfoUpdated` events.
///
/// A subscription failure arrives as a final `Err` item, after which `next`
/// returns `None`. Dropping the value releases the underlying subscription.
#[derive(Debug)]
pub struct PersonInfoSubscription {
    events: mpsc::Receiver<ContractResult<PersonInfoUpdate>>,
    forwarder: Option<JoinHandle<()>>,
}

impl PersonInfoSubscription {
    /// Decode logs from `logs` on a background task.
    pub(crate) fn spawn<S: LogSource>(mut logs: S) -> Self {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

        let forwarder = tokio::spawn(async move {
            loop {
                let item = match logs.recv().await {
                    Ok(log) => match decode_update(&log) {
                        Ok(update) => Ok(update),
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                tx_hash = ?log.transaction_hash,
                                "Skipping undecodable PersonInfoUpdated log"
                            );
                            continue;
                        }
                    },
                    Err(ChainError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event subscription lagged, notifications dropped");
                        continue;
                    }
                    Err(e) => Err(ContractError::from(e)),
                };

                let terminal = item.is_err();
                if tx.send(item).await.is_err() || terminal {
                    break;
                }
            }
        });

        Self {
            events: rx,
            forwarder: Some(forwarder),
        }
    }

    /// Build a subscription fed by an arbitrary channel.
    pub fn from_channel(events: mpsc::Receiver<ContractResult<PersonInfoUpdate>>) -> Self {
        Self {
            events,
            forwarder: None,
        }
    }

    /// Wait for the next event. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<ContractResult<PersonInfoUpdate>> {
        self.events.recv().await
    }

    /// Release the subscription. Stops the forwarder, which drops the log
    /// source and with it the node-side subscription.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.events.close();
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }
}

impl Drop for PersonInfoSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Decode a raw log into a `PersonInfoUpdate`.
pub(crate) fn decode_update(log: &Log) -> ContractResult<PersonInfoUpdate> {
    let decoded = log
        .log_decode::<PersonInfoUpdated>()
        .map_err(|e| ContractError::Decode(e.to_string()))?;
    let event = decoded.inner.data;

    let transaction_hash = log
        .transaction_hash
        .ok_or_else(|| ContractError::Decode("log carries no transaction hash".to_string()))?;

    Ok(PersonInfoUpdate {
        index: to_u64("personIndex", event.personIndex)?,
        name: event.newName,
        age: to_u64("newAge", event.newAge)?,
        transaction_hash,
    })
}
