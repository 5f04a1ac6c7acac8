//! `PersonRegistry` implementation over a live node.

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::{Filter, TransactionRequest};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;

use crate::blockchain::{ChainClient, ChainError, Wallet};
use crate::config::ContractConfig;
use crate::contract::abi::{getPersonInfoCall, getPersonsCountCall, setPersonInfoCall, PersonInfoUpdated};
use crate::contract::subscription::PersonInfoSubscription;
use crate::contract::types::{to_u64, ContractError, ContractResult, PersonInfo, PersonRegistry};

/// Contract gateway bound to one deployed registry and one signing key.
#[derive(Debug, Clone)]
pub struct ContractGateway {
    client: ChainClient,
    wallet: Wallet,
    address: Address,
    gas_limit: u64,
}

impl ContractGateway {
    /// Create a gateway for the contract named in `config`.
    pub fn new(client: ChainClient, wallet: Wallet, config: &ContractConfig) -> ContractResult<Self> {
        let address: Address = config
            .address
            .parse()
            .map_err(|_| ContractError::InvalidAddress(config.address.clone()))?;

        tracing::info!(
            contract = %address,
            signer = %wallet.address(),
            gas_limit = config.gas_limit,
            "Contract gateway ready"
        );

        Ok(Self {
            client,
            wallet,
            address,
            gas_limit: config.gas_limit,
        })
    }

    /// Address of the bound contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Log filter matching `PersonInfoUpdated` on the bound contract.
    pub fn update_filter(&self) -> Filter {
        Filter::new()
            .address(self.address)
            .event(PersonInfoUpdated::SIGNATURE)
    }

    fn read_request(&self, input: Vec<u8>) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.address)
            .with_input(input)
    }
}

#[async_trait]
impl PersonRegistry for ContractGateway {
    async fn read_person_info(&self, index: u64) -> ContractResult<PersonInfo> {
        let call = getPersonInfoCall {
            _personIndex: U256::from(index),
        };
        let output = self.client.call(self.read_request(call.abi_encode())).await?;
        let returned = getPersonInfoCall::abi_decode_returns(&output)
            .map_err(|e| ContractError::Decode(e.to_string()))?;

        Ok(PersonInfo {
            name: returned._0,
            age: to_u64("age", returned._1)?,
        })
    }

    async fn read_persons_count(&self) -> ContractResult<u64> {
        let output = self
            .client
            .call(self.read_request(getPersonsCountCall {}.abi_encode()))
            .await?;
        let count = getPersonsCountCall::abi_decode_returns(&output)
            .map_err(|e| ContractError::Decode(e.to_string()))?;
        to_u64("count", count)
    }

    async fn submit_person_info(&self, name: &str, age: u64) -> ContractResult<TxHash> {
        let nonce = self.client.get_pending_nonce(self.wallet.address()).await?;
        let gas_price = self.client.get_gas_price().await?;

        let request = set_person_request(self.address, self.gas_limit, name, age, nonce, gas_price);
        let envelope = self.wallet.sign(request).await?;
        let signed_hash = *envelope.tx_hash();

        let tx_hash = self
            .client
            .send_raw_transaction(&envelope.encoded_2718())
            .await
            .map_err(|e| broadcast_error(signed_hash, e))?;

        tracing::info!(tx_hash = %tx_hash, nonce, gas_price = %gas_price, "Submitted setPersonInfo");
        Ok(tx_hash)
    }

    async fn subscribe_person_info_updated(&self) -> ContractResult<PersonInfoSubscription> {
        let logs = self.client.subscribe_logs(&self.update_filter()).await?;
        tracing::info!(contract = %self.address, "Subscribed to PersonInfoUpdated");
        Ok(PersonInfoSubscription::spawn(logs))
    }
}

/// Unsigned `setPersonInfo` request: value zero, fixed gas limit.
fn set_person_request(
    contract: Address,
    gas_limit: u64,
    name: &str,
    age: u64,
    nonce: u64,
    gas_price: u128,
) -> TransactionRequest {
    let call = setPersonInfoCall {
        _name: name.to_string(),
        _age: U256::from(age),
    };
    TransactionRequest::default()
        .with_to(contract)
        .with_input(call.abi_encode())
        .with_nonce(nonce)
        .with_gas_price(gas_price)
        .with_gas_limit(gas_limit)
        .with_value(U256::ZERO)
}

/// Only a node error response is a definite rejection. Anything else may have
/// reached the node, so the signed hash travels with the error.
fn broadcast_error(signed_hash: TxHash, error: ChainError) -> ContractError {
    match error {
        ChainError::Rejected(_) => ContractError::Chain(error),
        source => {
            tracing::warn!(tx_hash = %signed_hash, error = %source, "Broadcast outcome unknown");
            ContractError::BroadcastUnknown {
                tx_hash: signed_hash,
                source,
            }
        }
    }
}
