//! Transaction resolution.
//!
//! # Data Flow
//! ```text
//! hash ─▶ parse ─▶ TransactionStore::get ──hit──▶ record (Cached)
//!                        │ miss
//!                        ▼
//!        transaction ─▶ receipt ─▶ block header   (ChainReader)
//!                        │
//!                        ▼
//!              map_record ─▶ insert ─▶ record (Fetched)
//!                              │ duplicate
//!                              └──▶ re-read stored record
//! ```
//!
//! # Design Decisions
//! - A stored hash never triggers chain calls again
//! - Pending transactions are reported, not cached
//! - Batches are sequential and fail fast

pub mod hashes;
pub mod mapping;
pub mod service;

pub use hashes::HashInputError;
pub use service::{BatchOptions, ErrorKind, ResolutionOutcome, ResolveError, TransactionResolver};
