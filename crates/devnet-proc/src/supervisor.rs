//! Isolated worker processes
//!
//! The contract deployment step drives third-party tooling that installs
//! signal handlers and mutates global state. It therefore runs in a separate
//! worker process rather than a thread: a crash over there cannot corrupt
//! the orchestrator. The worker serializes any error as text on its stderr
//! pipe, which acts as a single-slot channel drained after the join.

use crate::command::{run_command, CommandSpec};
use crate::error::ProcessError;

/// Runs a worker process to completion and surfaces its serialized error,
/// if any, as [`ProcessError::Worker`]. The error is never lost even though
/// the worker has already exited by the time it is read.
pub async fn run_isolated(worker: &CommandSpec) -> Result<(), ProcessError> {
    tracing::debug!("starting isolated worker: {}", worker.display());
    match run_command(worker).await {
        Ok(()) => Ok(()),
        Err(ProcessError::CommandFailed { stderr, .. }) => {
            let message = stderr.trim();
            let message = if message.is_empty() {
                "worker exited with failure".to_string()
            } else {
                message.to_string()
            };
            Err(ProcessError::Worker(message))
        }
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_worker_success() {
        let worker = CommandSpec::new("true");
        run_isolated(&worker).await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_error_is_drained() {
        let worker = CommandSpec::new("sh").args(["-c", "echo 'deploy exploded' >&2; exit 1"]);
        let err = run_isolated(&worker).await.unwrap_err();
        match err {
            ProcessError::Worker(message) => assert_eq!(message, "deploy exploded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_silent_worker_failure_still_surfaces() {
        let worker = CommandSpec::new("false");
        let err = run_isolated(&worker).await.unwrap_err();
        assert!(matches!(err, ProcessError::Worker(_)));
    }
}
