//! Write path: submit `setPersonInfo` and wait for its receipt.

use alloy::primitives::TxHash;
use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::ChainError;
use crate::confirmation::{ConfirmError, ConfirmationWaiter};
use crate::contract::types::{ContractError, PersonRegistry};
use crate::observability::metrics;

/// Result of a confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub transaction_hash: TxHash,
    /// True only when the receipt reports success.
    pub confirmed: bool,
}

/// Errors from the write path.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Building, signing or broadcasting failed.
    #[error("submission failed: {0}")]
    Contract(#[from] ContractError),

    /// The broadcast may have reached the node; its outcome is unknown.
    #[error("transaction {tx_hash} broadcast outcome unknown: {source}")]
    BroadcastUnknown {
        tx_hash: TxHash,
        #[source]
        source: ChainError,
    },

    /// Broadcast succeeded but no receipt appeared in time.
    #[error("transaction {tx_hash} submitted but unconfirmed")]
    Unconfirmed { tx_hash: TxHash },

    /// Broadcast succeeded but the wait ended on a query failure or shutdown.
    #[error("transaction {tx_hash} submitted, confirmation failed: {source}")]
    Confirmation {
        tx_hash: TxHash,
        #[source]
        source: ConfirmError,
    },
}

impl SubmitError {
    /// Hash of the broadcast transaction, if it got that far.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Contract(_) => None,
            Self::BroadcastUnknown { tx_hash, .. }
            | Self::Unconfirmed { tx_hash }
            | Self::Confirmation { tx_hash, .. } => Some(*tx_hash),
        }
    }
}

/// Submits person info and waits for the outcome.
#[derive(Clone)]
pub struct PersonSubmitter {
    registry: Arc<dyn PersonRegistry>,
    waiter: ConfirmationWaiter,
}

impl PersonSubmitter {
    pub fn new(registry: Arc<dyn PersonRegistry>, waiter: ConfirmationWaiter) -> Self {
        Self { registry, waiter }
    }

    /// Submit `(name, age)` and await the receipt using the waiter's default
    /// deadline. Never retried.
    pub async fn submit(&self, name: &str, age: u64) -> Result<SubmissionOutcome, SubmitError> {
        let tx_hash = match self.registry.submit_person_info(name, age).await {
            Ok(hash) => hash,
            Err(ContractError::BroadcastUnknown { tx_hash, source }) => {
                metrics::record_submission("unknown");
                return Err(SubmitError::BroadcastUnknown { tx_hash, source });
            }
            Err(e) => {
                metrics::record_submission("error");
                return Err(e.into());
            }
        };

        match self.waiter.await_default(tx_hash).await {
            Ok(receipt) => {
                let result = if receipt.success { "confirmed" } else { "reverted" };
                metrics::record_submission(result);
                tracing::info!(tx_hash = %tx_hash, success = receipt.success, "Submission settled");
                Ok(SubmissionOutcome {
                    transaction_hash: tx_hash,
                    confirmed: receipt.success,
                })
            }
            Err(ConfirmError::Timeout { .. }) => {
                metrics::record_submission("unconfirmed");
                tracing::warn!(tx_hash = %tx_hash, "Submission unconfirmed before deadline");
                Err(SubmitError::Unconfirmed { tx_hash })
            }
            Err(source) => {
                metrics::record_submission("error");
                Err(SubmitError::Confirmation { tx_hash, source })
            }
        }
    }
}
