//! Chain data to `TransactionRecord`.

use crate::blockchain::{BlockHeader, ChainReceipt, ChainTransaction};
use crate::resolver::hashes::canonical;
use crate::store::{TransactionRecord, TransactionStatus};

/// Build the record for a mined transaction.
///
/// Recipient and contract address are empty strings when absent. Value is
/// kept as a decimal string so the full 256-bit range survives.
pub fn map_record(
    tx: &ChainTransaction,
    receipt: &ChainReceipt,
    header: &BlockHeader,
) -> TransactionRecord {
    TransactionRecord {
        id: 0,
        transaction_hash: canonical(&tx.hash),
        transaction_status: TransactionStatus::from_receipt(receipt.success),
        block_hash: format!("{:#x}", header.hash),
        block_number: header.number,
        from: format!("{:#x}", tx.from),
        to: tx.to.map(|to| format!("{:#x}", to)).unwrap_or_default(),
        contract_address: receipt
            .contract_address
            .map(|addr| format!("{:#x}", addr))
            .unwrap_or_default(),
        logs_count: receipt.logs_count as u64,
        input: alloy::hex::encode(&tx.input),
        value: tx.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256, Bytes, U256};

    #[test]
    fn test_contract_creation_mapping() {
        let tx = ChainTransaction {
            hash: b256!("00000000000000000000000000000000000000000000000000000000000000cc"),
            block_hash: Some(b256!("0000000000000000000000000000000000000000000000000000000000000111")),
            from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
            to: None,
            input: Bytes::from(vec![0x60, 0x80]),
            value: U256::MAX,
        };
        let receipt = ChainReceipt {
            transaction_hash: tx.hash,
            success: false,
            block_hash: tx.block_hash,
            block_number: Some(7),
            logs_count: 0,
            contract_address: Some(address!("5fbdb2315678afecb367f032d93f642f64180aa3")),
        };
        let header = BlockHeader {
            hash: b256!("0000000000000000000000000000000000000000000000000000000000000111"),
            number: 7,
        };

        let record = map_record(&tx, &receipt, &header);
        assert_eq!(record.transaction_status, TransactionStatus::Failed);
        assert_eq!(record.to, "");
        assert_eq!(record.contract_address, "0x5fbdb2315678afecb367f032d93f642f64180aa3");
        assert_eq!(record.input, "6080");
        assert_eq!(record.value, U256::MAX.to_string());
        assert_eq!(record.block_number, 7);
    }
}
