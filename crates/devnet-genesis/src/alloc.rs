//! Genesis allocation merging
//!
//! Two harvest passes feed the same allocation set: contract accounts from
//! `ext_dumpState` artifacts and externally-owned accounts from per-account
//! RPC queries. Both go through [`merge_allocation`], which normalizes the
//! address key and reshapes contract payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenesisError;
use crate::hex::{normalize_address, prefix_hex};

/// One merged genesis account. Contract fields sit flat next to balance and
/// nonce, matching the allocs checkpoint layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: String,
    pub nonce: u64,
    #[serde(rename = "codeHash", skip_serializing_if = "Option::is_none")]
    pub code_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<BTreeMap<String, String>>,
}

/// Point-in-time allocation snapshot. `root` is the source chain's state
/// root captured once at harvest start and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSet {
    pub root: String,
    pub accounts: BTreeMap<String, AccountState>,
}

impl AllocationSet {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            accounts: BTreeMap::new(),
        }
    }
}

/// Merges one harvested account into the set under its normalized address.
///
/// A `contract` payload replaces the entry's body via the dump extraction
/// rule; otherwise nonce defaults to 0 and balance to "0" when absent.
/// Last write wins: the contract and EOA passes are expected to cover
/// disjoint address sets, and an overlap silently overwrites.
pub fn merge_allocation(
    set: &mut AllocationSet,
    address: &str,
    data: &Value,
) -> Result<(), GenesisError> {
    tracing::info!("merging account data for {address}");

    let entry = match data.get("contract") {
        Some(payload) => extract_contract_data(payload)?,
        None => AccountState {
            balance: balance_or_default(data),
            nonce: nonce_or_default(data)?,
            code_hash: None,
            code: None,
            storage: None,
        },
    };

    set.accounts.insert(normalize_address(address), entry);
    Ok(())
}

/// Reshapes the `contract` member of a raw dump: code hash and code gain
/// the `0x` prefix, storage keys are re-prefixed while values pass through
/// untouched. Balance and nonce of contract accounts come from the genesis
/// document itself, so they stay at their defaults here.
fn extract_contract_data(payload: &Value) -> Result<AccountState, GenesisError> {
    let code_hash = required_str(payload, "codeHash")?;
    let code = required_str(payload, "code")?;
    let raw_storage = payload
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| GenesisError::MalformedDump("contract payload has no data map".into()))?;

    let mut storage = BTreeMap::new();
    for (key, value) in raw_storage {
        let value = value
            .as_str()
            .ok_or_else(|| GenesisError::MalformedDump(format!("storage value for {key} is not a string")))?;
        storage.insert(prefix_hex(key), value.to_string());
    }

    Ok(AccountState {
        balance: "0".to_string(),
        nonce: 0,
        code_hash: Some(prefix_hex(code_hash)),
        code: Some(prefix_hex(code)),
        storage: Some(storage),
    })
}

fn required_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str, GenesisError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| GenesisError::MalformedDump(format!("contract payload has no {field}")))
}

fn balance_or_default(data: &Value) -> String {
    match data.get("balance").and_then(Value::as_str) {
        Some(balance) if !balance.is_empty() => balance.to_string(),
        _ => "0".to_string(),
    }
}

fn nonce_or_default(data: &Value) -> Result<u64, GenesisError> {
    match data.get("nonce") {
        None => Ok(0),
        Some(Value::Number(number)) => number
            .as_u64()
            .ok_or_else(|| GenesisError::InvalidNonce(number.to_string())),
        // Dumps carry nonces as decimal strings
        Some(Value::String(text)) => text
            .parse::<u64>()
            .map_err(|_| GenesisError::InvalidNonce(text.clone())),
        Some(other) => Err(GenesisError::InvalidNonce(other.to_string())),
    }
}
