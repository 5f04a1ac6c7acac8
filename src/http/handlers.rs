//! Route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::http::response::{
    ApiError, CountResponse, HealthResponse, PersonResponse, PersonsResponse, SavePersonRequest,
    SavePersonResponse, TransactionsResponse,
};
use crate::http::server::AppState;
use crate::resolver::hashes::{decode_rlp_hashes, require_hashes};
use crate::resolver::BatchOptions;

const HASHES_PARAM: &str = "transactionHashes";

/// `GET /lime/eth?transactionHashes=h1,h2&transactionHashes=h3`
pub async fn get_eth(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let values = params
        .into_iter()
        .filter(|(key, _)| key == HASHES_PARAM)
        .map(|(_, value)| value);
    let hashes = require_hashes(values).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let transactions = state
        .resolver
        .resolve_batch(&hashes, BatchOptions::default())
        .await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// `GET /lime/eth/{rlphex}`
pub async fn get_eth_rlp(
    State(state): State<AppState>,
    Path(rlphex): Path<String>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let hashes = decode_rlp_hashes(&rlphex).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let transactions = state
        .resolver
        .resolve_batch(&hashes, BatchOptions::default())
        .await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// `GET /lime/all`
pub async fn get_all(State(state): State<AppState>) -> Result<Json<TransactionsResponse>, ApiError> {
    let transactions = state.transactions.get_all().await?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// `POST /lime/savePerson`
pub async fn save_person(
    State(state): State<AppState>,
    Json(request): Json<SavePersonRequest>,
) -> Result<Json<SavePersonResponse>, ApiError> {
    let outcome = state.submitter.submit(&request.name, request.age).await?;
    Ok(Json(SavePersonResponse {
        tx_hash: format!("{:#x}", outcome.transaction_hash),
        tx_status: outcome.confirmed,
    }))
}

/// `GET /lime/listPersons`
pub async fn list_persons(State(state): State<AppState>) -> Result<Json<PersonsResponse>, ApiError> {
    let persons = state.events.get_all().await?;
    Ok(Json(PersonsResponse { persons }))
}

/// `GET /lime/persons/count`
pub async fn persons_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state.registry.read_persons_count().await?;
    Ok(Json(CountResponse { count }))
}

/// `GET /lime/persons/{index}`
pub async fn person_by_index(
    State(state): State<AppState>,
    Path(index): Path<u64>,
) -> Result<Json<PersonResponse>, ApiError> {
    let person = state.registry.read_person_info(index).await?;
    Ok(Json(PersonResponse {
        index,
        name: person.name,
        age: person.age,
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let node_healthy = state.node.is_healthy().await;
    let ingest_running = state.ingest_running.load(std::sync::atomic::Ordering::SeqCst);

    let status = if node_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = HealthResponse {
        status: if node_healthy { "ok" } else { "degraded" },
        node_healthy,
        ingest_running,
    };
    (status, Json(body))
}
