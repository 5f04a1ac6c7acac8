//! Contract-level types and the `PersonRegistry` seam.

use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::blockchain::ChainError;
use crate::contract::subscription::PersonInfoSubscription;

/// Errors raised by contract reads, writes and subscriptions.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The signed transaction may or may not have reached the node.
    #[error("broadcast of {tx_hash} unresolved: {source}")]
    BroadcastUnknown {
        tx_hash: TxHash,
        #[source]
        source: ChainError,
    },

    /// Returned data or a log did not match the ABI.
    #[error("ABI decode error: {0}")]
    Decode(String),

    /// A uint256 field does not fit in 64 bits.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: U256 },

    /// The configured contract address is unusable.
    #[error("invalid contract address '{0}'")]
    InvalidAddress(String),
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// A person entry as read from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonInfo {
    pub name: String,
    pub age: u64,
}

/// A decoded `PersonInfoUpdated` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonInfoUpdate {
    pub index: u64,
    pub name: String,
    pub age: u64,
    pub transaction_hash: TxHash,
}

/// Typed access to the person-registry contract.
#[async_trait]
pub trait PersonRegistry: Send + Sync {
    /// Read the entry stored at `index`.
    async fn read_person_info(&self, index: u64) -> ContractResult<PersonInfo>;

    /// Number of entries stored in the contract.
    async fn read_persons_count(&self) -> ContractResult<u64>;

    /// Sign and broadcast `setPersonInfo(name, age)`.
    ///
    /// Not idempotent. When the broadcast outcome is unknown the error is
    /// `ContractError::BroadcastUnknown`, which carries the signed hash.
    async fn submit_person_info(&self, name: &str, age: u64) -> ContractResult<TxHash>;

    /// Open a live subscription to `PersonInfoUpdated` events.
    async fn subscribe_person_info_updated(&self) -> ContractResult<PersonInfoSubscription>;
}

/// Narrow a uint256 contract value to `u64`.
pub(crate) fn to_u64(field: &'static str, value: U256) -> ContractResult<u64> {
    u64::try_from(value).map_err(|_| ContractError::OutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_u64_bounds() {
        assert_eq!(to_u64("age", U256::from(42u64)).unwrap(), 42);
        assert_eq!(to_u64("age", U256::from(u64::MAX)).unwrap(), u64::MAX);

        let err = to_u64("age", U256::from(u64::MAX) + U256::from(1u64)).unwrap_err();
        assert!(matches!(err, ContractError::OutOfRange { field: "age", .. }));
    }
}
