//! Ethereum transaction fetcher and person-registry gateway.

pub mod blockchain;
pub mod confirmation;
pub mod config;
pub mod contract;
pub mod http;
pub mod ingest;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod resolver;
pub mod store;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
