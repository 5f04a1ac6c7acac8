//! Response bodies and error mapping.
//!
//! # Status mapping
//! - malformed input → 400
//! - pending transaction → 409
//! - chain or contract failure → 502
//! - store failure → 500
//! - submitted but unconfirmed, or broadcast outcome unknown → 202 with
//!   `txStatus = false`
//! - wait cancelled by shutdown → 503

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::confirmation::ConfirmError;
use crate::contract::{ContractError, SubmitError};
use crate::resolver::ResolveError;
use crate::store::{PersonInfoEvent, StoreError, TransactionRecord};

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SavePersonRequest {
    pub name: String,
    pub age: u64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavePersonResponse {
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    #[serde(rename = "txStatus")]
    pub tx_status: bool,
}

#[derive(Debug, Serialize)]
pub struct PersonsResponse {
    pub persons: Vec<PersonInfoEvent>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub index: u64,
    pub name: String,
    pub age: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(rename = "nodeHealthy")]
    pub node_healthy: bool,
    #[serde(rename = "ingestRunning")]
    pub ingest_running: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Resolve(ResolveError),
    Submit(SubmitError),
    Contract(ContractError),
    Store(StoreError),
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        Self::Submit(e)
    }
}

impl From<ContractError> for ApiError {
    fn from(e: ContractError) -> Self {
        Self::Contract(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Resolve(ResolveError::InvalidHash(_)) => StatusCode::BAD_REQUEST,
            Self::Resolve(ResolveError::Pending(_)) => StatusCode::CONFLICT,
            Self::Resolve(ResolveError::Fetch { .. }) => StatusCode::BAD_GATEWAY,
            Self::Resolve(ResolveError::Store { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Submit(SubmitError::Unconfirmed { .. })
            | Self::Submit(SubmitError::BroadcastUnknown { .. }) => StatusCode::ACCEPTED,
            Self::Submit(SubmitError::Confirmation {
                source: ConfirmError::Cancelled(_),
                ..
            }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Submit(_) | Self::Contract(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Resolve(e) => e.to_string(),
            Self::Submit(e) => e.to_string(),
            Self::Contract(e) => e.to_string(),
            Self::Store(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let Self::Submit(
            SubmitError::Unconfirmed { tx_hash } | SubmitError::BroadcastUnknown { tx_hash, .. },
        ) = &self
        {
            tracing::warn!(tx_hash = %tx_hash, error = %self.message(), "Submission not settled");
            let body = SavePersonResponse {
                tx_hash: format!("{:#x}", tx_hash),
                tx_status: false,
            };
            return (status, Json(body)).into_response();
        }

        let message = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ChainError;
    use alloy::primitives::TxHash;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Resolve(ResolveError::Pending("0x1".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Resolve(ResolveError::InvalidHash("zz".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Submit(SubmitError::Unconfirmed { tx_hash: TxHash::ZERO }).status(),
            StatusCode::ACCEPTED
        );
        assert_eq!(
            ApiError::Submit(SubmitError::BroadcastUnknown {
                tx_hash: TxHash::ZERO,
                source: ChainError::Timeout(10),
            })
            .status(),
            StatusCode::ACCEPTED
        );
        assert_eq!(
            ApiError::Store(StoreError::DuplicateKey("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
