//! Genesis pipeline errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenesisError {
    /// A declared contract has no dump artifact; the pipeline cannot
    /// proceed without every contract's state.
    #[error("missing state dump artifact at {0}")]
    MissingDump(PathBuf),

    #[error("invalid hex value '{0}'")]
    InvalidHex(String),

    #[error("invalid nonce value '{0}'")]
    InvalidNonce(String),

    #[error("malformed dump payload: {0}")]
    MalformedDump(String),

    #[error("malformed alloc entry: {0}")]
    MalformedAlloc(String),

    /// A base genesis field on the allowlist is absent from the overlaid
    /// document
    #[error("genesis field '{0}' is missing")]
    MissingField(&'static str),

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
