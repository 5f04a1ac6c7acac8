//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! AppConfig (node URLs, signing key)
//!     → client.rs (HTTP query endpoint + WebSocket push endpoint)
//!     → reader.rs (point-query seam used by resolver and waiter)
//!     → wallet.rs (key loading, signing)
//! ```
//!
//! # Security Constraints
//! - Private key only from the startup configuration
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Both endpoints must be reachable at startup

pub mod client;
pub mod reader;
pub mod types;
pub mod wallet;

pub use client::{ChainClient, LogSubscription};
pub use reader::{ChainReader, NodeHealth};
pub use types::{BlockHeader, ChainConfig, ChainError, ChainId, ChainReceipt, ChainResult, ChainTransaction};
pub use wallet::Wallet;
