//! Persistent stores for resolved transactions and ingested events.
//!
//! # Data Flow
//! ```text
//! TransactionResolver ──insert/get──▶ TransactionStore (unique on hash)
//! EventIngestor ───────insert───────▶ EventStore (unique on person index)
//!                                          │
//!                                          ▼
//!                              journal.rs (append-only JSON lines)
//! ```
//!
//! # Design Decisions
//! - Uniqueness constraints are the only concurrency control the core relies on
//! - A duplicate insert is reported as `StoreError::DuplicateKey`, never silently merged
//! - Records are never updated or deleted

pub mod journal;
pub mod memory;
pub mod traits;
pub mod types;

pub use memory::{MemoryEventStore, MemoryTransactionStore};
pub use traits::{EventStore, TransactionStore};
pub use types::{PersonInfoEvent, StoreError, StoreResult, TransactionRecord, TransactionStatus};
