//! Cache-aside transaction resolution.

use std::sync::Arc;
use thiserror::Error;

use crate::blockchain::{ChainError, ChainReader};
use crate::observability::metrics;
use crate::resolver::hashes::{canonical, normalize_hashes, parse_hash};
use crate::resolver::mapping::map_record;
use crate::store::{StoreError, TransactionRecord, TransactionStore};

/// Error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Pending,
    Fetch,
    Store,
}

/// Errors from resolving a transaction hash.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Input is not a 32-byte hex hash.
    #[error("invalid transaction hash '{0}'")]
    InvalidHash(String),

    /// Known to the node but not yet mined.
    #[error("transaction {0} is pending")]
    Pending(String),

    /// The chain did not provide what resolution needs.
    #[error("failed to fetch transaction {hash}: {reason}")]
    Fetch { hash: String, reason: String },

    /// The store rejected a read or write.
    #[error("store failure for transaction {hash}: {source}")]
    Store {
        hash: String,
        #[source]
        source: StoreError,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHash(_) | Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Pending(_) => ErrorKind::Pending,
            Self::Store { .. } => ErrorKind::Store,
        }
    }

    fn fetch(hash: &str, reason: impl Into<String>) -> Self {
        Self::Fetch {
            hash: hash.to_string(),
            reason: reason.into(),
        }
    }

    fn chain(hash: &str, err: ChainError) -> Self {
        Self::fetch(hash, err.to_string())
    }
}

/// How a single resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Served from the store without chain calls.
    Cached,
    /// Fetched from the chain and stored.
    Fetched,
    Pending,
    Failed(String),
}

impl ResolutionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Fetched => "fetched",
            Self::Pending => "pending",
            Self::Failed(_) => "failed",
        }
    }
}

/// Options for `resolve_batch`.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Trim, drop empty entries, and remove exact duplicates first.
    pub dedupe: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { dedupe: true }
    }
}

/// Resolves transaction hashes into stored records.
///
/// Holds no locks: concurrent resolutions of the same hash are settled by the
/// store's uniqueness constraint.
#[derive(Clone)]
pub struct TransactionResolver {
    chain: Arc<dyn ChainReader>,
    store: Arc<dyn TransactionStore>,
}

impl TransactionResolver {
    pub fn new(chain: Arc<dyn ChainReader>, store: Arc<dyn TransactionStore>) -> Self {
        Self { chain, store }
    }

    /// Resolve one hash, consulting the chain only on a store miss.
    pub async fn resolve(&self, input: &str) -> Result<TransactionRecord, ResolveError> {
        let result = self.resolve_inner(input).await;

        let outcome = match &result {
            Ok((_, outcome)) => outcome.clone(),
            Err(ResolveError::Pending(_)) => ResolutionOutcome::Pending,
            Err(e) => ResolutionOutcome::Failed(e.to_string()),
        };
        metrics::record_resolution(outcome.label());

        match &outcome {
            ResolutionOutcome::Failed(reason) => {
                tracing::warn!(tx_hash = %input, reason = %reason, "Resolution failed")
            }
            other => tracing::debug!(tx_hash = %input, outcome = other.label(), "Resolution finished"),
        }

        result.map(|(record, _)| record)
    }

    /// Resolve hashes sequentially in input order.
    ///
    /// The first failure aborts the batch; later hashes are never resolved.
    pub async fn resolve_batch<S: AsRef<str>>(
        &self,
        hashes: &[S],
        options: BatchOptions,
    ) -> Result<Vec<TransactionRecord>, ResolveError> {
        let inputs: Vec<String> = if options.dedupe {
            normalize_hashes(hashes)
        } else {
            hashes.iter().map(|h| h.as_ref().to_string()).collect()
        };

        let mut records = Vec::with_capacity(inputs.len());
        for input in &inputs {
            records.push(self.resolve(input).await?);
        }
        Ok(records)
    }

    async fn resolve_inner(
        &self,
        input: &str,
    ) -> Result<(TransactionRecord, ResolutionOutcome), ResolveError> {
        let tx_hash = parse_hash(input).ok_or_else(|| ResolveError::InvalidHash(input.to_string()))?;
        let key = canonical(&tx_hash);

        if let Some(record) = self.load(&key).await? {
            return Ok((record, ResolutionOutcome::Cached));
        }

        let tx = self
            .chain
            .transaction_by_hash(tx_hash)
            .await
            .map_err(|e| ResolveError::chain(&key, e))?
            .ok_or_else(|| ResolveError::fetch(&key, "transaction not found"))?;

        if tx.is_pending() {
            return Err(ResolveError::Pending(key));
        }

        let receipt = self
            .chain
            .transaction_receipt(tx_hash)
            .await
            .map_err(|e| ResolveError::chain(&key, e))?
            .ok_or_else(|| ResolveError::fetch(&key, "receipt not found"))?;

        let block_hash = receipt
            .block_hash
            .or(tx.block_hash)
            .ok_or_else(|| ResolveError::fetch(&key, "receipt has no block hash"))?;

        let header = self
            .chain
            .header_by_hash(block_hash)
            .await
            .map_err(|e| ResolveError::chain(&key, e))?
            .ok_or_else(|| ResolveError::fetch(&key, format!("block {:#x} not found", block_hash)))?;

        let record = map_record(&tx, &receipt, &header);

        match self.store.insert(record).await {
            Ok(stored) => Ok((stored, ResolutionOutcome::Fetched)),
            Err(StoreError::DuplicateKey(_)) => {
                tracing::debug!(tx_hash = %key, "Lost insert race, reading stored record");
                let stored = self
                    .load(&key)
                    .await?
                    .ok_or_else(|| ResolveError::fetch(&key, "record vanished after duplicate insert"))?;
                Ok((stored, ResolutionOutcome::Fetched))
            }
            Err(source) => Err(ResolveError::Store { hash: key, source }),
        }
    }

    async fn load(&self, key: &str) -> Result<Option<TransactionRecord>, ResolveError> {
        self.store.get(key).await.map_err(|source| ResolveError::Store {
            hash: key.to_string(),
            source,
        })
    }
}
