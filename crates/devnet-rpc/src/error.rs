//! RPC error taxonomy
//!
//! The liveness prober needs to tell "not listening yet" apart from "the
//! endpoint answered with an error", so transport failures and endpoint
//! errors are distinct variants instead of one broad error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    /// The endpoint responded with a JSON-RPC `error` member. Fatal for
    /// every harvest call.
    #[error("rpc endpoint error for {method}: {message}")]
    Endpoint {
        method: &'static str,
        message: String,
    },

    /// The request never produced a response. Treated as "not ready yet"
    /// during liveness probing, fatal everywhere else.
    #[error("rpc transport error: {0}")]
    Transport(String),

    /// The bounded TCP probe exhausted its retries
    #[error("timed out waiting for port {port} on {host} after {retries} retries")]
    PortUnreachable {
        host: String,
        port: u16,
        retries: u32,
    },
}

impl RpcError {
    /// Whether the error only means the endpoint has not come up yet
    pub fn is_transient(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}
