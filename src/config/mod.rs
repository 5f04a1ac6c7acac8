//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed by reference into every constructor at startup
//! ```
//!
//! # Design Decisions
//! - Config is built once; no component reads the environment afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The signing key is redacted in Debug and Serialize output

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::ChainConfig;
pub use schema::ConfirmationConfig;
pub use schema::ContractConfig;
pub use schema::IngestConfig;
pub use schema::ObservabilityConfig;
