//! JSON-RPC surface of the devnet launcher
//!
//! Wraps the handful of `eth_*` calls the state harvest needs, the
//! RSK-specific `ext_dumpState` introspection call, and the TCP/RPC
//! liveness probes used before each pipeline stage.

pub mod client;
pub mod error;
pub mod probe;

pub use client::EthClient;
pub use error::RpcError;
pub use probe::{wait_for_port, wait_for_rpc};
