//! Dual-endpoint node client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC (HTTP) endpoint and the WebSocket endpoint
//! - Point queries (transactions, receipts, headers, nonce, gas price)
//! - Contract calls and raw transaction broadcast
//! - Log subscriptions over the push endpoint
//! - Health check for node connectivity
//!
//! Point queries and push notifications are different transport capabilities,
//! so the two endpoints are held separately. Failing to reach either at
//! startup is fatal.

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction as _, TxEnvelope};
use alloy::primitives::{Address, Bytes, TxHash, B256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::pubsub::Subscription;
use alloy::rpc::types::{Filter, Log, Transaction, TransactionReceipt, TransactionRequest};
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use crate::blockchain::reader::{ChainReader, NodeHealth};
use crate::blockchain::types::{
    BlockHeader, ChainConfig, ChainError, ChainId, ChainReceipt, ChainResult, ChainTransaction,
};
use crate::observability::metrics;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Node client holding the query providers and the subscription provider.
#[derive(Clone)]
pub struct ChainClient {
    /// Query providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Push provider for subscriptions.
    pubsub: DynProvider,
    /// Configuration.
    config: ChainConfig,
    /// Chain ID reported by the node at startup.
    chain_id: ChainId,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Connect both endpoints and verify the chain ID.
    ///
    /// # Errors
    /// `ChainError::Connect` if either endpoint is unreachable,
    /// `ChainError::ChainMismatch` if the node serves another chain.
    pub async fn connect(config: &ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        let mut providers = Vec::new();

        // 1. Query providers: primary, then failovers
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| ChainError::Connect {
            endpoint: "http",
            url: config.rpc_url.clone(),
            reason: format!("invalid URL: {}", e),
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        // 2. Push provider
        let ws = WsConnect::new(config.ws_url.clone());
        let pubsub = match timeout(connect_timeout, async { ProviderBuilder::new().connect_ws(ws).await }).await {
            Ok(Ok(provider)) => Arc::new(provider) as DynProvider,
            Ok(Err(e)) => {
                return Err(ChainError::Connect {
                    endpoint: "websocket",
                    url: config.ws_url.clone(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ChainError::Connect {
                    endpoint: "websocket",
                    url: config.ws_url.clone(),
                    reason: format!("timed out after {}s", config.connect_timeout_secs),
                })
            }
        };

        let mut client = Self {
            providers,
            pubsub,
            config: config.clone(),
            chain_id: ChainId(config.chain_id),
            timeout_duration,
        };

        // 3. Chain ID doubles as the reachability probe for the query endpoint
        let reported = client.get_chain_id().await.map_err(|e| ChainError::Connect {
            endpoint: "http",
            url: config.rpc_url.clone(),
            reason: e.to_string(),
        })?;
        if config.chain_id != 0 && reported.0 != config.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: config.chain_id,
                actual: reported.0,
            });
        }
        client.chain_id = reported;

        tracing::info!(
            rpc_url = %config.rpc_url,
            ws_url = %config.ws_url,
            failovers = client.providers.len() - 1,
            chain_id = reported.0,
            "Chain client connected"
        );

        Ok(client)
    }

    /// Run a query against each query provider in order until one answers.
    async fn query<T, F, Fut>(&self, method: &'static str, op: F) -> ChainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_chain_call(method, true);
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        metrics::record_chain_call(method, false);
        Err(ChainError::Rpc(format!("All RPC providers failed for {}", method)))
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> ChainResult<ChainId> {
        self.query("eth_chainId", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> ChainResult<u64> {
        self.query("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }

    /// Get the pending transaction count (nonce) for an address.
    pub async fn get_pending_nonce(&self, address: Address) -> ChainResult<u64> {
        self.query("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Get the node-suggested gas price in wei.
    pub async fn get_gas_price(&self) -> ChainResult<u128> {
        self.query("eth_gasPrice", |p| async move { p.get_gas_price().await })
            .await
    }

    /// Execute a read-only contract call.
    pub async fn call(&self, request: TransactionRequest) -> ChainResult<Bytes> {
        self.query("eth_call", |p| {
            let request = request.clone();
            async move { p.call(request).await }
        })
        .await
    }

    /// Broadcast a signed transaction through the primary provider only.
    ///
    /// Never retried here. Only `ChainError::Rejected` proves the node
    /// refused it; a timeout or transport failure leaves the outcome unknown.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<TxHash> {
        let provider = self.providers[0].clone();
        let sent = timeout(self.timeout_duration, async move {
            provider.send_raw_transaction(raw).await
        })
        .await;

        match sent {
            Ok(Ok(pending)) => {
                metrics::record_chain_call("eth_sendRawTransaction", true);
                Ok(*pending.tx_hash())
            }
            Ok(Err(e)) if e.is_error_resp() => {
                metrics::record_chain_call("eth_sendRawTransaction", false);
                Err(ChainError::Rejected(e.to_string()))
            }
            Ok(Err(e)) => {
                metrics::record_chain_call("eth_sendRawTransaction", false);
                Err(ChainError::Rpc(format!("eth_sendRawTransaction failed: {}", e)))
            }
            Err(_) => {
                metrics::record_chain_call("eth_sendRawTransaction", false);
                Err(ChainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Open a log subscription on the push endpoint.
    pub async fn subscribe_logs(&self, filter: &Filter) -> ChainResult<LogSubscription> {
        let pubsub = self.pubsub.clone();
        let subscribed = timeout(self.timeout_duration, async move {
            pubsub.subscribe_logs(filter).await
        })
        .await;

        match subscribed {
            Ok(Ok(inner)) => {
                metrics::record_chain_call("eth_subscribe", true);
                Ok(LogSubscription {
                    id: *inner.local_id(),
                    inner,
                    pubsub: self.pubsub.clone(),
                })
            }
            Ok(Err(e)) => {
                metrics::record_chain_call("eth_subscribe", false);
                Err(ChainError::Rpc(format!("eth_subscribe failed: {}", e)))
            }
            Err(_) => {
                metrics::record_chain_call("eth_subscribe", false);
                Err(ChainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Check if the node is reachable and healthy.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_node_health(healthy);
        healthy
    }

    /// Chain ID reported by the node at startup.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

#[async_trait]
impl ChainReader for ChainClient {
    async fn transaction_by_hash(&self, hash: TxHash) -> ChainResult<Option<ChainTransaction>> {
        let tx = self
            .query("eth_getTransactionByHash", |p| async move {
                p.get_transaction_by_hash(hash).await
            })
            .await?;
        tx.map(transaction_from_rpc).transpose()
    }

    async fn transaction_receipt(&self, hash: TxHash) -> ChainResult<Option<ChainReceipt>> {
        let receipt = self
            .query("eth_getTransactionReceipt", |p| async move {
                p.get_transaction_receipt(hash).await
            })
            .await?;
        Ok(receipt.map(receipt_from_rpc))
    }

    async fn header_by_hash(&self, hash: B256) -> ChainResult<Option<BlockHeader>> {
        let block = self
            .query("eth_getBlockByHash", |p| async move { p.get_block_by_hash(hash).await })
            .await?;
        Ok(block.map(|block| BlockHeader {
            hash: block.header.hash,
            number: block.header.inner.number,
        }))
    }
}

#[async_trait]
impl NodeHealth for ChainClient {
    async fn is_healthy(&self) -> bool {
        ChainClient::is_healthy(self).await
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("ws_url", &self.config.ws_url)
            .field("chain_id", &self.chain_id.0)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

/// Live log subscription on the push endpoint. Dropping it sends
/// `eth_unsubscribe` for the node-side subscription.
pub struct LogSubscription {
    id: B256,
    inner: Subscription<Log>,
    pubsub: DynProvider,
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        match self.pubsub.root().unsubscribe(self.id) {
            Ok(()) => tracing::debug!(subscription = %self.id, "Log subscription released"),
            Err(e) => tracing::debug!(subscription = %self.id, error = %e, "eth_unsubscribe failed"),
        }
    }
}

impl LogSubscription {
    /// Wait for the next log.
    pub async fn recv(&mut self) -> ChainResult<Log> {
        match self.inner.recv().await {
            Ok(log) => Ok(log),
            Err(RecvError::Lagged(skipped)) => Err(ChainError::Lagged(skipped)),
            Err(RecvError::Closed) => Err(ChainError::SubscriptionClosed(
                "websocket subscription ended".to_string(),
            )),
        }
    }
}

fn transaction_from_rpc(tx: Transaction) -> ChainResult<ChainTransaction> {
    transaction_from_envelope(tx.inner.inner(), tx.block_hash)
}

/// Build a `ChainTransaction`, recovering the sender from the signature.
fn transaction_from_envelope(
    envelope: &TxEnvelope,
    block_hash: Option<B256>,
) -> ChainResult<ChainTransaction> {
    let from = envelope
        .recover_signer()
        .map_err(|e| ChainError::Decode(format!("failed to recover sender: {}", e)))?;

    Ok(ChainTransaction {
        hash: *envelope.tx_hash(),
        block_hash,
        from,
        to: envelope.to(),
        input: envelope.input().clone(),
        value: envelope.value(),
    })
}

fn receipt_from_rpc(receipt: TransactionReceipt) -> ChainReceipt {
    ChainReceipt {
        transaction_hash: receipt.transaction_hash,
        success: receipt.status(),
        block_hash: receipt.block_hash,
        block_number: receipt.block_number,
        logs_count: receipt.inner.logs().len(),
        contract_address: receipt.contract_address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::{SignableTransaction, TxLegacy};
    use alloy::primitives::{TxKind, U256};
    use alloy::signers::local::PrivateKeySigner;
    use alloy::signers::SignerSync;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn signed_legacy(to: TxKind) -> (TxEnvelope, Address) {
        let signer: PrivateKeySigner = TEST_PRIVATE_KEY.parse().unwrap();
        let tx = TxLegacy {
            chain_id: Some(31337),
            nonce: 7,
            gas_price: 1_000_000_000,
            gas_limit: 300_000,
            to,
            value: U256::from(1_000_000_000_000_000_000u128),
            input: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        };
        let signature = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
        (TxEnvelope::Legacy(tx.into_signed(signature)), signer.address())
    }

    #[test]
    fn test_sender_is_recovered_from_signature() {
        let recipient = Address::repeat_byte(0x22);
        let (envelope, signer_address) = signed_legacy(TxKind::Call(recipient));

        let tx = transaction_from_envelope(&envelope, Some(B256::repeat_byte(0x11))).unwrap();
        assert_eq!(tx.from, signer_address);
        assert_eq!(tx.to, Some(recipient));
        assert_eq!(tx.hash, *envelope.tx_hash());
        assert_eq!(tx.value.to_string(), "1000000000000000000");
        assert_eq!(tx.input.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert!(!tx.is_pending());
    }

    #[test]
    fn test_contract_creation_has_no_recipient() {
        let (envelope, _) = signed_legacy(TxKind::Create);
        let tx = transaction_from_envelope(&envelope, None).unwrap();
        assert_eq!(tx.to, None);
        assert!(tx.is_pending());
    }

    #[tokio::test]
    async fn test_unreachable_websocket_is_fatal() {
        let config = ChainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ws_url: "ws://127.0.0.1:1".to_string(),
            connect_timeout_secs: 2,
            rpc_timeout_secs: 2,
            ..ChainConfig::default()
        };

        let err = ChainClient::connect(&config).await.unwrap_err();
        assert!(matches!(err, ChainError::Connect { endpoint: "websocket", .. }));
    }
}
