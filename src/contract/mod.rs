//! Person-registry contract access.
//!
//! # Data Flow
//! ```text
//! Reads:   PersonRegistry::read_* ──eth_call──▶ ChainClient (HTTP)
//! Writes:  PersonSubmitter ─▶ submit_person_info ─▶ sign ─▶ eth_sendRawTransaction
//!                         └─▶ ConfirmationWaiter
//! Events:  eth_subscribe(logs) (WebSocket) ─▶ forwarder task ─▶ PersonInfoSubscription
//! ```
//!
//! # Design Decisions
//! - One `PersonRegistry` trait is the seam for mocks
//! - Submissions use the pending nonce and are never retried automatically
//! - Undecodable logs are skipped; a subscription failure is the final item

pub mod abi;
pub mod gateway;
pub mod submit;
pub mod subscription;
pub mod types;

pub use gateway::ContractGateway;
pub use submit::{PersonSubmitter, SubmissionOutcome, SubmitError};
pub use subscription::PersonInfoSubscription;
pub use types::{ContractError, ContractResult, PersonInfo, PersonInfoUpdate, PersonRegistry};
