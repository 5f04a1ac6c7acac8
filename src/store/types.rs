//! Persisted record types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution status derived from the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Successful,
    Failed,
}

impl TransactionStatus {
    /// Receipt status 1 is success; anything else is failure.
    pub fn from_receipt(success: bool) -> Self {
        if success {
            Self::Successful
        } else {
            Self::Failed
        }
    }
}

/// An enriched, immutable record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Store-assigned id, 0 until inserted.
    #[serde(default)]
    pub id: u64,
    pub transaction_hash: String,
    pub transaction_status: TransactionStatus,
    pub block_hash: String,
    pub block_number: u64,
    pub from: String,
    /// Empty for contract creation.
    pub to: String,
    /// Empty unless the transaction deployed a contract.
    pub contract_address: String,
    pub logs_count: u64,
    /// Call data as hex without a `0x` prefix.
    pub input: String,
    /// Transferred wei as a decimal string.
    pub value: String,
}

/// A `PersonInfoUpdated` event keyed by the contract-assigned index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInfoEvent {
    /// Store-assigned id, 0 until inserted.
    #[serde(default)]
    pub id: u64,
    pub person_index: u64,
    pub person_name: String,
    pub person_age: u64,
    pub transaction_hash: String,
}

/// Errors that can be returned by a store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same unique key already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Journal I/O failed.
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal content could not be (de)serialized.
    #[error("journal encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
