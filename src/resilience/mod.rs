//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Event subscription failure:
//!     → backoff.rs (exponential delay with jitter)
//!     → reconnect, up to ingest.max_reconnect_attempts
//! ```
//!
//! # Design Decisions
//! - Timeouts live with the calls they bound (chain client, waiter)
//! - Writes are never retried automatically

pub mod backoff;
