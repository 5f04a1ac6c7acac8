//! Shared mocks for integration tests.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;

use eth_fetcher::blockchain::{
    BlockHeader, ChainError, ChainReader, ChainReceipt, ChainResult, ChainTransaction, NodeHealth,
};
use eth_fetcher::contract::{
    ContractError, ContractResult, PersonInfo, PersonInfoSubscription, PersonInfoUpdate, PersonRegistry,
};

pub const SENDER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const RECIPIENT: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

/// Build a 32-byte hash from a short hex prefix, right-padded with zeros.
pub fn hash(prefix: &str) -> B256 {
    let hex = prefix.trim_start_matches("0x");
    format!("0x{:0<64}", hex).parse().unwrap()
}

/// Canonical string form of `hash(prefix)`.
pub fn hash_str(prefix: &str) -> String {
    format!("{:#x}", hash(prefix))
}

pub fn mined_tx(tx_hash: TxHash, block_hash: B256) -> ChainTransaction {
    ChainTransaction {
        hash: tx_hash,
        block_hash: Some(block_hash),
        from: SENDER.parse().unwrap(),
        to: Some(RECIPIENT.parse().unwrap()),
        input: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
        value: U256::from(1_000_000_000_000_000_000u128),
    }
}

pub fn pending_tx(tx_hash: TxHash) -> ChainTransaction {
    ChainTransaction {
        block_hash: None,
        ..mined_tx(tx_hash, B256::ZERO)
    }
}

pub fn receipt(tx_hash: TxHash, block_hash: B256, success: bool, logs_count: usize) -> ChainReceipt {
    ChainReceipt {
        transaction_hash: tx_hash,
        success,
        block_hash: Some(block_hash),
        block_number: None,
        logs_count,
        contract_address: None,
    }
}

/// In-memory chain with call counters.
#[derive(Default)]
pub struct MockChain {
    transactions: Mutex<HashMap<TxHash, ChainTransaction>>,
    receipts: Mutex<HashMap<TxHash, ChainReceipt>>,
    headers: Mutex<HashMap<B256, BlockHeader>>,
    queried: Mutex<Vec<TxHash>>,
    pub tx_calls: AtomicU32,
    pub receipt_calls: AtomicU32,
    pub header_calls: AtomicU32,
    /// Receipt polls answered with "not found" before the stored receipt shows.
    pub receipt_delay_polls: AtomicU32,
    /// When set, receipt queries fail with this transport error.
    pub receipt_error: Mutex<Option<String>>,
    /// When set, transaction queries fail with this transport error.
    pub tx_error: Mutex<Option<String>>,
    /// Artificial latency on transaction lookups, to widen races.
    pub latency: Mutex<Duration>,
    /// Artificial latency on receipt lookups.
    pub receipt_latency: Mutex<Duration>,
    pub unhealthy: AtomicBool,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mined transaction with its receipt and block header.
    pub fn add_mined(&self, tx: ChainTransaction, receipt: ChainReceipt, number: u64) {
        let block_hash = receipt.block_hash.unwrap();
        self.headers.lock().unwrap().insert(
            block_hash,
            BlockHeader {
                hash: block_hash,
                number,
            },
        );
        self.receipts.lock().unwrap().insert(tx.hash, receipt);
        self.transactions.lock().unwrap().insert(tx.hash, tx);
    }

    pub fn add_transaction(&self, tx: ChainTransaction) {
        self.transactions.lock().unwrap().insert(tx.hash, tx);
    }

    pub fn add_receipt(&self, receipt: ChainReceipt) {
        self.receipts.lock().unwrap().insert(receipt.transaction_hash, receipt);
    }

    pub fn remove_header(&self, block_hash: B256) {
        self.headers.lock().unwrap().remove(&block_hash);
    }

    /// Hashes passed to `transaction_by_hash`, in call order.
    pub fn queried(&self) -> Vec<TxHash> {
        self.queried.lock().unwrap().clone()
    }

    pub fn calls(&self, counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn transaction_by_hash(&self, tx_hash: TxHash) -> ChainResult<Option<ChainTransaction>> {
        self.tx_calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(tx_hash);

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.tx_error.lock().unwrap().clone() {
            return Err(ChainError::Rpc(message));
        }
        Ok(self.transactions.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> ChainResult<Option<ChainReceipt>> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);

        let latency = *self.receipt_latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.receipt_error.lock().unwrap().clone() {
            return Err(ChainError::Rpc(message));
        }

        let pending_polls = self.receipt_delay_polls.load(Ordering::SeqCst);
        if pending_polls > 0 {
            self.receipt_delay_polls.store(pending_polls - 1, Ordering::SeqCst);
            return Ok(None);
        }
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn header_by_hash(&self, block_hash: B256) -> ChainResult<Option<BlockHeader>> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.headers.lock().unwrap().get(&block_hash).copied())
    }
}

#[async_trait]
impl NodeHealth for MockChain {
    async fn is_healthy(&self) -> bool {
        !self.unhealthy.load(Ordering::SeqCst)
    }
}

/// Sender half feeding a channel-backed subscription.
pub type EventSender = mpsc::Sender<ContractResult<PersonInfoUpdate>>;

pub fn channel_subscription() -> (EventSender, PersonInfoSubscription) {
    let (tx, rx) = mpsc::channel(16);
    (tx, PersonInfoSubscription::from_channel(rx))
}

pub fn update(index: u64, name: &str, age: u64) -> PersonInfoUpdate {
    PersonInfoUpdate {
        index,
        name: name.to_string(),
        age,
        transaction_hash: hash("aa"),
    }
}

/// Registry whose subscriptions and submissions are scripted by the test.
#[derive(Default)]
pub struct MockRegistry {
    subscriptions: Mutex<VecDeque<ContractResult<PersonInfoSubscription>>>,
    persons: Mutex<Vec<PersonInfo>>,
    submit_results: Mutex<VecDeque<ContractResult<TxHash>>>,
    pub subscribe_calls: AtomicU32,
    pub submit_calls: AtomicU32,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a subscription for the next `subscribe_person_info_updated`.
    pub fn push_subscription(&self, subscription: PersonInfoSubscription) {
        self.subscriptions.lock().unwrap().push_back(Ok(subscription));
    }

    /// Queue a failure for the next `subscribe_person_info_updated`.
    pub fn push_subscribe_error(&self, message: &str) {
        self.subscriptions
            .lock()
            .unwrap()
            .push_back(Err(ContractError::Chain(ChainError::Rpc(message.to_string()))));
    }

    pub fn push_submit_result(&self, result: ContractResult<TxHash>) {
        self.submit_results.lock().unwrap().push_back(result);
    }

    pub fn add_person(&self, name: &str, age: u64) {
        self.persons.lock().unwrap().push(PersonInfo {
            name: name.to_string(),
            age,
        });
    }
}

#[async_trait]
impl PersonRegistry for MockRegistry {
    async fn read_person_info(&self, index: u64) -> ContractResult<PersonInfo> {
        self.persons
            .lock()
            .unwrap()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| ContractError::Decode(format!("execution reverted: no person {}", index)))
    }

    async fn read_persons_count(&self) -> ContractResult<u64> {
        Ok(self.persons.lock().unwrap().len() as u64)
    }

    async fn submit_person_info(&self, _name: &str, _age: u64) -> ContractResult<TxHash> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ContractError::Chain(ChainError::Rpc("nonce too low".into()))))
    }

    async fn subscribe_person_info_updated(&self) -> ContractResult<PersonInfoSubscription> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.subscriptions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ContractError::Chain(ChainError::Rpc("connection refused".into()))))
    }
}

pub fn address(raw: &str) -> Address {
    raw.parse().unwrap()
}
