//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`tx_hash`, `index`) rather than formatted messages
//! - Secrets never reach a log line
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
