//! In-process stores backed by `DashMap`, optionally journaled to disk.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::journal::Journal;
use crate::store::traits::{EventStore, TransactionStore};
use crate::store::types::{PersonInfoEvent, StoreError, StoreResult, TransactionRecord};

/// Transaction store with a unique index on the transaction hash.
#[derive(Debug)]
pub struct MemoryTransactionStore {
    by_hash: DashMap<String, TransactionRecord>,
    hash_by_id: DashMap<u64, String>,
    next_id: AtomicU64,
    journal: Option<Journal>,
}

impl MemoryTransactionStore {
    /// Create a store that keeps records in memory only.
    pub fn new() -> Self {
        Self {
            by_hash: DashMap::new(),
            hash_by_id: DashMap::new(),
            next_id: AtomicU64::new(1),
            journal: None,
        }
    }

    /// Open a store, replaying the journal at `path` when one is given.
    pub fn open(path: Option<&str>) -> StoreResult<Self> {
        let Some(path) = path else {
            return Ok(Self::new());
        };

        let (journal, records) = Journal::open::<TransactionRecord>(path)?;
        let mut store = Self::new();
        for record in records {
            store.restore(record);
        }
        store.journal = Some(journal);

        tracing::info!(path, records = store.len(), "Transaction store loaded");
        Ok(store)
    }

    fn restore(&mut self, record: TransactionRecord) {
        self.next_id.fetch_max(record.id + 1, Ordering::SeqCst);
        self.hash_by_id.insert(record.id, record.transaction_hash.clone());
        self.by_hash.insert(record.transaction_hash.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

impl Default for MemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn get(&self, hash: &str) -> StoreResult<Option<TransactionRecord>> {
        Ok(self.by_hash.get(hash).map(|r| r.value().clone()))
    }

    async fn insert(&self, mut record: TransactionRecord) -> StoreResult<TransactionRecord> {
        // The entry guard holds the shard lock, so the journal write and the
        // index update are atomic with respect to a racing insert.
        match self.by_hash.entry(record.transaction_hash.clone()) {
            Entry::Occupied(existing) => Err(StoreError::DuplicateKey(existing.key().clone())),
            Entry::Vacant(slot) => {
                record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
                if let Some(journal) = &self.journal {
                    journal.append(&record)?;
                }
                self.hash_by_id.insert(record.id, record.transaction_hash.clone());
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn get_all(&self) -> StoreResult<Vec<TransactionRecord>> {
        let mut records: Vec<_> = self.by_hash.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    async fn get_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<TransactionRecord>> {
        let mut records: Vec<_> = ids
            .iter()
            .filter_map(|id| self.hash_by_id.get(id).map(|h| h.value().clone()))
            .filter_map(|hash| self.by_hash.get(&hash).map(|r| r.value().clone()))
            .collect();
        records.sort_by_key(|r| r.id);
        records.dedup_by_key(|r| r.id);
        Ok(records)
    }
}

/// Event store with a unique index on the contract-assigned person index.
#[derive(Debug)]
pub struct MemoryEventStore {
    by_index: DashMap<u64, PersonInfoEvent>,
    next_id: AtomicU64,
    journal: Option<Journal>,
}

impl MemoryEventStore {
    /// Create a store that keeps events in memory only.
    pub fn new() -> Self {
        Self {
            by_index: DashMap::new(),
            next_id: AtomicU64::new(1),
            journal: None,
        }
    }

    /// Open a store, replaying the journal at `path` when one is given.
    pub fn open(path: Option<&str>) -> StoreResult<Self> {
        let Some(path) = path else {
            return Ok(Self::new());
        };

        let (journal, events) = Journal::open::<PersonInfoEvent>(path)?;
        let mut store = Self::new();
        for event in events {
            store.next_id.fetch_max(event.id + 1, Ordering::SeqCst);
            store.by_index.insert(event.person_index, event);
        }
        store.journal = Some(journal);

        tracing::info!(path, events = store.len(), "Event store loaded");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, mut event: PersonInfoEvent) -> StoreResult<PersonInfoEvent> {
        match self.by_index.entry(event.person_index) {
            Entry::Occupied(existing) => Err(StoreError::DuplicateKey(format!(
                "person index {}",
                existing.key()
            ))),
            Entry::Vacant(slot) => {
                event.id = self.next_id.fetch_add(1, Ordering::SeqCst);
                if let Some(journal) = &self.journal {
                    journal.append(&event)?;
                }
                slot.insert(event.clone());
                Ok(event)
            }
        }
    }

    async fn get_all(&self) -> StoreResult<Vec<PersonInfoEvent>> {
        let mut events: Vec<_> = self.by_index.iter().map(|r| r.value().clone()).collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    async fn get_by_index(&self, index: u64) -> StoreResult<Option<PersonInfoEvent>> {
        Ok(self.by_index.get(&index).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::TransactionStatus;
    use std::sync::Arc;

    fn record(hash: &str) -> TransactionRecord {
        TransactionRecord {
            id: 0,
            transaction_hash: hash.to_string(),
            transaction_status: TransactionStatus::Successful,
            block_hash: "0x11".to_string(),
            block_number: 1,
            from: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".to_string(),
            to: String::new(),
            contract_address: String::new(),
            logs_count: 0,
            input: String::new(),
            value: "0".to_string(),
        }
    }

    fn event(index: u64, name: &str) -> PersonInfoEvent {
        PersonInfoEvent {
            id: 0,
            person_index: index,
            person_name: name.to_string(),
            person_age: 30,
            transaction_hash: "0xaa".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_rejects_duplicates() {
        let store = MemoryTransactionStore::new();
        let first = store.insert(record("0x01")).await.unwrap();
        let second = store.insert(record("0x02")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let err = store.insert(record("0x01")).await.unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("0x01").await.unwrap().unwrap().id, 1);
        assert!(store.get("0x03").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_exactly_one_wins() {
        let store = Arc::new(MemoryTransactionStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.insert(record("0xrace")).await }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert!(e.is_duplicate()),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_ids_and_get_all_are_ordered() {
        let store = MemoryTransactionStore::new();
        for hash in ["0x0a", "0x0b", "0x0c"] {
            store.insert(record(hash)).await.unwrap();
        }

        let picked = store.get_by_ids(&[3, 1, 99, 1]).await.unwrap();
        let hashes: Vec<_> = picked.iter().map(|r| r.transaction_hash.as_str()).collect();
        assert_eq!(hashes, vec!["0x0a", "0x0c"]);

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_transaction_journal_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.jsonl");
        let path = path.to_str().unwrap();

        {
            let store = MemoryTransactionStore::open(Some(path)).unwrap();
            store.insert(record("0x01")).await.unwrap();
            store.insert(record("0x02")).await.unwrap();
        }

        let reopened = MemoryTransactionStore::open(Some(path)).unwrap();
        assert_eq!(reopened.len(), 2);
        assert!(reopened.insert(record("0x01")).await.unwrap_err().is_duplicate());
        let third = reopened.insert(record("0x03")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_event_index_is_unique() {
        let store = MemoryEventStore::new();
        store.insert(event(0, "alice")).await.unwrap();
        let err = store.insert(event(0, "alice again")).await.unwrap_err();
        assert!(err.is_duplicate());

        let stored = store.get_by_index(0).await.unwrap().unwrap();
        assert_eq!(stored.person_name, "alice");
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_event_journal_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let path = path.to_str().unwrap();

        {
            let store = MemoryEventStore::open(Some(path)).unwrap();
            store.insert(event(4, "bob")).await.unwrap();
        }

        let reopened = MemoryEventStore::open(Some(path)).unwrap();
        assert!(reopened.insert(event(4, "bob")).await.unwrap_err().is_duplicate());
        assert_eq!(reopened.get_all().await.unwrap()[0].person_name, "bob");
    }
}
