use async_trait::async_trait;

use crate::store::types::{PersonInfoEvent, StoreResult, TransactionRecord};

/// Durable storage for resolved transactions.
///
/// Uniqueness on the transaction hash is load-bearing: concurrent resolvers
/// rely on `insert` rejecting the second writer with
/// `StoreError::DuplicateKey` instead of storing a second row.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Look up a record by canonical hash. `Ok(None)` is a cache miss.
    async fn get(&self, hash: &str) -> StoreResult<Option<TransactionRecord>>;

    /// Insert a new record, returning it with its assigned id.
    async fn insert(&self, record: TransactionRecord) -> StoreResult<TransactionRecord>;

    /// All records ordered by id.
    async fn get_all(&self) -> StoreResult<Vec<TransactionRecord>>;

    /// Records with the given ids, ordered by id. Unknown ids are skipped.
    async fn get_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<TransactionRecord>>;
}

/// Durable storage for ingested contract events.
///
/// Uniqueness on the contract-assigned index absorbs replayed deliveries.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event, returning it with its assigned id.
    async fn insert(&self, event: PersonInfoEvent) -> StoreResult<PersonInfoEvent>;

    /// All events ordered by id.
    async fn get_all(&self) -> StoreResult<Vec<PersonInfoEvent>>;

    /// Look up an event by its contract index.
    async fn get_by_index(&self, index: u64) -> StoreResult<Option<PersonInfoEvent>>;
}
