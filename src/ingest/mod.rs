//! Contract event ingestion.
//!
//! # Data Flow
//! ```text
//! PersonRegistry::subscribe_person_info_updated
//!     → PersonInfoSubscription (live, push-based)
//!     → EventIngestor (one task for the process lifetime)
//!     → EventStore::insert (unique on person index)
//! ```
//!
//! # Design Decisions
//! - Replays are absorbed by the store's index uniqueness
//! - Bounded reconnection with exponential backoff; 0 attempts means fail-stop
//! - No backfill of events missed while disconnected

pub mod ingestor;

pub use ingestor::{EventIngestor, StopReason};
