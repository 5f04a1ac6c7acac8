//! Chain-specific types and error definitions.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use thiserror::Error;

// Re-export ChainConfig from config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// An endpoint could not be reached at startup.
    #[error("failed to connect to {endpoint} endpoint '{url}': {reason}")]
    Connect {
        endpoint: &'static str,
        url: String,
        reason: String,
    },

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node answered with an error response. The request was not accepted.
    #[error("rejected by node: {0}")]
    Rejected(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Node returned data that could not be interpreted.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// The push subscription ended.
    #[error("subscription closed: {0}")]
    SubscriptionClosed(String),

    /// The local subscription buffer overflowed and events were dropped.
    #[error("subscription lagged, {0} notifications dropped")]
    Lagged(u64),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// A transaction as reported by the node.
///
/// `from` is always the address recovered from the transaction signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTransaction {
    pub hash: TxHash,
    /// `None` while the transaction sits in the mempool.
    pub block_hash: Option<B256>,
    pub from: Address,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
}

impl ChainTransaction {
    /// Whether the transaction has not been included in a block yet.
    pub fn is_pending(&self) -> bool {
        self.block_hash.is_none()
    }
}

/// Post-execution outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub logs_count: usize,
    /// Set only when the transaction deployed a contract.
    pub contract_address: Option<Address>,
}

/// Per-block metadata used to attribute a transaction to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub hash: B256,
    pub number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
    }

    #[test]
    fn test_pending_detection() {
        let mut tx = ChainTransaction {
            hash: TxHash::ZERO,
            block_hash: None,
            from: Address::ZERO,
            to: None,
            input: Bytes::new(),
            value: U256::ZERO,
        };
        assert!(tx.is_pending());
        tx.block_hash = Some(B256::repeat_byte(0x11));
        assert!(!tx.is_pending());
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = ChainError::Connect {
            endpoint: "websocket",
            url: "ws://localhost:8546".to_string(),
            reason: "refused".to_string(),
        };
        assert!(err.to_string().contains("websocket"));
    }
}
