//! Transaction confirmation.
//!
//! # Data Flow
//! ```text
//! PersonSubmitter ──tx hash──▶ ConfirmationWaiter
//!                                  │ tick every poll_interval
//!                                  ▼
//!                            ChainReader::transaction_receipt
//!                                  │
//!              found ◀─────────────┼─────────────▶ not found: keep polling
//!                                  │
//!                    deadline / shutdown / query error
//! ```
//!
//! # Design Decisions
//! - "Receipt not found" is transient; every other query error ends the wait
//! - The first poll is immediate, so a zero timeout still polls once

pub mod waiter;

pub use waiter::{ConfirmError, ConfirmationWaiter};
