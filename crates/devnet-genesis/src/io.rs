//! JSON artifact reading and writing
//!
//! Every artifact the pipeline produces (allocs checkpoint, deploy config,
//! genesis files) is written with two-space indentation.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::GenesisError;

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, GenesisError> {
    let file = File::open(path).map_err(|source| GenesisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| GenesisError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), GenesisError> {
    let file = File::create(path).map_err(|source| GenesisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(BufWriter::new(file), formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| GenesisError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    serializer
        .into_inner()
        .flush()
        .map_err(|source| GenesisError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the dump artifact `ext_dumpState` produced for one account.
/// `account` is the unprefixed address used in the filename convention.
/// Every declared contract must have a dump, so a missing file is fatal.
pub fn load_dump(dir: &Path, account: &str) -> Result<Value, GenesisError> {
    let path = dir.join(format!("rskdump-{account}.json"));
    tracing::info!("reading account dump from {}", path.display());
    if !path.exists() {
        return Err(GenesisError::MissingDump(path));
    }
    read_json(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::AllocationSet;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("allocs-l1.json");

        let set = AllocationSet::new("0xabc");
        write_json(&path, &set).unwrap();

        let loaded: AllocationSet = read_json(&path).unwrap();
        assert_eq!(loaded, set);
    }

    #[test]
    fn test_two_space_indentation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_json(&path, &json!({ "a": { "b": 1 } })).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"a\""));
        assert!(text.contains("\n    \"b\""));
    }

    #[test]
    fn test_load_dump() {
        let dir = tempdir().unwrap();
        let dump = json!({ "cd34": { "balance": "0" } });
        write_json(&dir.path().join("rskdump-cd34.json"), &dump).unwrap();

        let loaded = load_dump(dir.path(), "cd34").unwrap();
        assert_eq!(loaded, dump);
    }

    #[test]
    fn test_missing_dump_is_fatal() {
        let dir = tempdir().unwrap();
        let err = load_dump(dir.path(), "cd34").unwrap_err();
        assert!(matches!(err, GenesisError::MissingDump(_)));
    }
}
