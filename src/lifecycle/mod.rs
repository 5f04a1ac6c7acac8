//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Logging → Metrics → Chain client (both endpoints)
//!     → Wallet → Gateway → Stores → Ingestor task → HTTP listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Cancel ingestor and waiters → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One cancellation signal shared by every long-running task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
