//! RSK genesis format conversion
//!
//! The generated L1 genesis uses the geth schema; RSK regtest wants its own.
//! Conversion overlays the generated document over the RSK defaults, keeps
//! only an allowlist of base fields, forces the regtest proof-of-work
//! substitutes, and reshapes every alloc entry.

use serde_json::{Map, Value};

use crate::error::GenesisError;
use crate::hex::{hex_to_decimal, strip_hex_prefix};

/// Base fields copied from the overlaid document; everything else is
/// dropped on purpose. Schema narrowing, not data loss.
const BASE_GENESIS_KEYS: [&str; 9] = [
    "coinbase",
    "timestamp",
    "parentHash",
    "extraData",
    "nonce",
    "bitcoinMergedMiningHeader",
    "bitcoinMergedMiningMerkleProof",
    "bitcoinMergedMiningCoinbaseTransaction",
    "minimumGasPrice",
];

/// Regtest requires these exact genesis values for its proof-of-work
/// substitute, whatever the source says.
const RSK_GAS_LIMIT: &str = "0x989680";
const RSK_DIFFICULTY: &str = "0x0000000001";

/// Overlays `generated` over `defaults`; generated values win on collision,
/// fields absent from it are inherited from the defaults.
pub fn overlay_genesis(
    defaults: &Map<String, Value>,
    generated: &Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = defaults.clone();
    for (key, value) in generated {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Translates a source genesis document into the RSK genesis schema.
pub fn convert_genesis(
    source: &Map<String, Value>,
    defaults: &Map<String, Value>,
) -> Result<Map<String, Value>, GenesisError> {
    tracing::info!("formatting generated genesis file for use in rsk");
    let merged = overlay_genesis(defaults, source);

    let mut target = Map::new();
    for key in BASE_GENESIS_KEYS {
        let value = merged
            .get(key)
            .cloned()
            .ok_or(GenesisError::MissingField(key))?;
        target.insert(key.to_string(), value);
    }
    target.insert(
        "gasLimit".to_string(),
        Value::String(RSK_GAS_LIMIT.to_string()),
    );
    target.insert(
        "difficulty".to_string(),
        Value::String(RSK_DIFFICULTY.to_string()),
    );

    // RSK spells the field in lower case
    if let Some(mix_hash) = merged.get("mixHash") {
        target.insert("mixhash".to_string(), mix_hash.clone());
    }

    if let Some(alloc) = merged.get("alloc").and_then(Value::as_object) {
        let mut converted = Map::new();
        for (address, entry) in alloc {
            converted.insert(address.clone(), convert_alloc_entry(entry)?);
        }
        target.insert("alloc".to_string(), Value::Object(converted));
    }

    Ok(target)
}

/// Reshapes one alloc entry: balance and nonce become decimal strings, code
/// and storage move under an unprefixed `contract` object. Fields absent
/// from the source are simply omitted.
pub fn convert_alloc_entry(entry: &Value) -> Result<Value, GenesisError> {
    let source = entry
        .as_object()
        .ok_or_else(|| GenesisError::MalformedAlloc(entry.to_string()))?;

    let mut target = Map::new();
    if let Some(balance) = source.get("balance").and_then(Value::as_str) {
        target.insert(
            "balance".to_string(),
            Value::String(hex_to_decimal(balance)?),
        );
    }
    if let Some(nonce) = source.get("nonce").and_then(Value::as_str) {
        target.insert("nonce".to_string(), Value::String(hex_to_decimal(nonce)?));
    }

    let mut contract = Map::new();
    if let Some(code) = source.get("code").and_then(Value::as_str) {
        contract.insert(
            "code".to_string(),
            Value::String(strip_hex_prefix(code).to_string()),
        );
    }
    if let Some(storage) = source.get("storage").and_then(Value::as_object) {
        let mut data = Map::new();
        for (key, value) in storage {
            let value = value
                .as_str()
                .ok_or_else(|| GenesisError::MalformedAlloc(format!("storage value for {key}")))?;
            data.insert(
                strip_hex_prefix(key).to_string(),
                Value::String(strip_hex_prefix(value).to_string()),
            );
        }
        contract.insert("data".to_string(), Value::Object(data));
    }
    if !contract.is_empty() {
        target.insert("contract".to_string(), Value::Object(contract));
    }

    Ok(Value::Object(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn defaults() -> Map<String, Value> {
        as_map(json!({
            "coinbase": "0x3333333333333333333333333333333333333333",
            "timestamp": "0x00",
            "parentHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "extraData": "0x00",
            "nonce": "0x0",
            "bitcoinMergedMiningHeader": "0x",
            "bitcoinMergedMiningMerkleProof": "0x",
            "bitcoinMergedMiningCoinbaseTransaction": "0x",
            "minimumGasPrice": "0x00",
            "gasLimit": "0xffffff",
            "difficulty": "0x20000"
        }))
    }

    #[test]
    fn test_convert_alloc_entry_full() {
        let entry = json!({
            "balance": "0xde0b6b3a7640000",
            "nonce": "0x5",
            "code": "0x6001600155",
            "storage": { "0x01": "0x02" }
        });
        let converted = convert_alloc_entry(&entry).unwrap();
        assert_eq!(
            converted,
            json!({
                "balance": "1000000000000000000",
                "nonce": "5",
                "contract": {
                    "code": "6001600155",
                    "data": { "01": "02" }
                }
            })
        );
    }

    #[test]
    fn test_convert_alloc_entry_omits_absent_fields() {
        let converted = convert_alloc_entry(&json!({ "balance": "0x0" })).unwrap();
        assert_eq!(converted, json!({ "balance": "0" }));

        let converted = convert_alloc_entry(&json!({})).unwrap();
        assert_eq!(converted, json!({}));
    }

    #[test]
    fn test_forced_gas_limit_and_difficulty() {
        let mut source = defaults();
        source.insert("gasLimit".into(), json!("0x1"));
        source.insert("difficulty".into(), json!("0xffffffff"));

        let target = convert_genesis(&source, &defaults()).unwrap();
        assert_eq!(target["gasLimit"], "0x989680");
        assert_eq!(target["difficulty"], "0x0000000001");
    }

    #[test]
    fn test_allowlist_narrowing() {
        let mut source = defaults();
        source.insert("config".into(), json!({ "chainId": 900 }));
        source.insert("baseFeePerGas".into(), json!("0x3b9aca00"));

        let target = convert_genesis(&source, &defaults()).unwrap();
        assert!(target.get("config").is_none());
        assert!(target.get("baseFeePerGas").is_none());
        assert!(target.get("coinbase").is_some());
    }

    #[test]
    fn test_overlay_source_wins() {
        let mut source = Map::new();
        source.insert("timestamp".into(), json!("0x64"));

        let target = convert_genesis(&source, &defaults()).unwrap();
        // Overridden by the source document
        assert_eq!(target["timestamp"], "0x64");
        // Inherited from the defaults
        assert_eq!(target["extraData"], "0x00");
    }

    #[test]
    fn test_mix_hash_rename() {
        let mut source = defaults();
        source.insert("mixHash".into(), json!("0xabc"));

        let target = convert_genesis(&source, &defaults()).unwrap();
        assert_eq!(target["mixhash"], "0xabc");
        assert!(target.get("mixHash").is_none());
    }

    #[test]
    fn test_missing_base_field_is_fatal() {
        let mut broken = defaults();
        broken.remove("coinbase");

        let err = convert_genesis(&Map::new(), &broken).unwrap_err();
        assert!(matches!(err, GenesisError::MissingField("coinbase")));
    }

    #[test]
    fn test_alloc_entries_are_converted() {
        let mut source = defaults();
        source.insert(
            "alloc".into(),
            json!({
                "0xcd34": { "balance": "0x2710", "nonce": "0x1" }
            }),
        );

        let target = convert_genesis(&source, &defaults()).unwrap();
        let alloc = target.get("alloc").unwrap();
        assert_eq!(
            alloc.get("0xcd34").unwrap(),
            &json!({ "balance": "10000", "nonce": "1" })
        );
    }

    #[test]
    fn test_alloc_round_trip_recovers_hex() {
        // Inverse of convert_alloc_entry, defined for entries that carry
        // every field
        fn invert(entry: &Value) -> Value {
            let balance = entry.get("balance").unwrap().as_str().unwrap();
            let nonce = entry.get("nonce").unwrap().as_str().unwrap();
            let contract = entry.get("contract").unwrap();
            let code = contract.get("code").unwrap().as_str().unwrap();
            let data = contract.get("data").unwrap().as_object().unwrap();
            let storage: Map<String, Value> = data
                .iter()
                .map(|(k, v)| {
                    (
                        format!("0x{k}"),
                        Value::String(format!("0x{}", v.as_str().unwrap())),
                    )
                })
                .collect();
            json!({
                "balance": format!("{:#x}", balance.parse::<u128>().unwrap()),
                "nonce": format!("{:#x}", nonce.parse::<u64>().unwrap()),
                "code": format!("0x{code}"),
                "storage": storage
            })
        }

        let original = json!({
            "balance": "0xde0b6b3a7640000",
            "nonce": "0x5",
            "code": "0x6001600155",
            "storage": { "0x01": "0x02" }
        });
        let converted = convert_alloc_entry(&original).unwrap();
        assert_eq!(invert(&converted), original);
    }
}
