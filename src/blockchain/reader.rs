//! Read-only chain queries used by resolution and confirmation.

use alloy::primitives::{TxHash, B256};
use async_trait::async_trait;

use crate::blockchain::types::{BlockHeader, ChainReceipt, ChainResult, ChainTransaction};

/// Point queries against the synchronous node endpoint.
///
/// "Not found" is reported as `Ok(None)`; `Err` is reserved for transport
/// and decoding failures.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Look up a transaction, with its sender recovered from the signature.
    async fn transaction_by_hash(&self, hash: TxHash) -> ChainResult<Option<ChainTransaction>>;

    /// Look up the receipt of a mined transaction.
    async fn transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<ChainReceipt>>;

    /// Look up the header of a block.
    async fn header_by_hash(&self, hash: B256) -> ChainResult<Option<BlockHeader>>;
}

/// Liveness probe for the node.
#[async_trait]
pub trait NodeHealth: Send + Sync {
    async fn is_healthy(&self) -> bool;
}
