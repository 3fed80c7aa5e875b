//! Process execution errors

use std::time::Duration;
use thiserror::Error;

/// Errors raised while supervising external tool invocations
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The command ran to completion but exited non-zero
    #[error("command '{command}' failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The command exceeded its wall-clock budget and was killed
    #[error("command '{command}' timed out after {timeout:?}")]
    CommandTimedOut { command: String, timeout: Duration },

    /// An isolated worker process reported a serialized error
    #[error("worker process error: {0}")]
    Worker(String),

    #[error("failed to spawn or wait on child process")]
    Io(#[from] std::io::Error),
}
