//! Parsing of user-supplied transaction hash lists.

use alloy::primitives::TxHash;
use alloy::rlp::Decodable;
use std::collections::HashSet;
use thiserror::Error;

/// Rejected hash-list input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashInputError {
    #[error("no transaction hashes given")]
    Empty,

    #[error("invalid hex payload: {0}")]
    Hex(String),

    #[error("invalid RLP payload: {0}")]
    Rlp(String),
}

/// Flatten repeated and comma-separated values into one list.
///
/// Entries are trimmed, empty entries dropped, and exact duplicates removed
/// keeping the first occurrence.
pub fn normalize_hashes<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut hashes = Vec::new();
    for value in values {
        for part in value.as_ref().split(',') {
            let part = part.trim();
            if !part.is_empty() && seen.insert(part.to_string()) {
                hashes.push(part.to_string());
            }
        }
    }
    hashes
}

/// Like `normalize_hashes`, but an empty result is an error.
pub fn require_hashes<I, S>(values: I) -> Result<Vec<String>, HashInputError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let hashes = normalize_hashes(values);
    if hashes.is_empty() {
        return Err(HashInputError::Empty);
    }
    Ok(hashes)
}

/// Decode a hex-encoded RLP list of hash strings.
pub fn decode_rlp_hashes(rlp_hex: &str) -> Result<Vec<String>, HashInputError> {
    let raw = rlp_hex.strip_prefix("0x").unwrap_or(rlp_hex);
    let bytes = alloy::hex::decode(raw).map_err(|e| HashInputError::Hex(e.to_string()))?;

    let mut buf = bytes.as_slice();
    let decoded = Vec::<String>::decode(&mut buf).map_err(|e| HashInputError::Rlp(e.to_string()))?;
    if !buf.is_empty() {
        return Err(HashInputError::Rlp(format!("{} trailing bytes", buf.len())));
    }

    require_hashes(decoded)
}

/// Parse a hash string into its 32-byte form.
pub fn parse_hash(input: &str) -> Option<TxHash> {
    input.trim().parse::<TxHash>().ok()
}

/// Canonical store key: `0x` followed by 64 lowercase hex characters.
pub fn canonical(hash: &TxHash) -> String {
    format!("{:#x}", hash)
}
