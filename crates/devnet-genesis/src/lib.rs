//! Genesis reconciliation between the deployer chain and RSK regtest
//!
//! The devnet deploys the bedrock contracts onto one L1 implementation and
//! boots a second one pre-seeded with the same state. This crate does the
//! reshaping in between:
//! - merging per-account state dumps and EOA balances into one allocation
//!   set keyed by normalized address
//! - converting the merged genesis document into the RSK genesis schema
//!   (allowlisted base fields, decimal balances, unprefixed storage)
//! - reading and writing the JSON checkpoint artifacts

pub mod alloc;
pub mod convert;
pub mod error;
pub mod hex;
pub mod io;

pub use alloc::{merge_allocation, AccountState, AllocationSet};
pub use convert::{convert_alloc_entry, convert_genesis, overlay_genesis};
pub use error::GenesisError;
pub use hex::{hex_to_decimal, hex_to_u64, normalize_address, prefix_hex, strip_hex_prefix};
pub use io::{load_dump, read_json, write_json};
