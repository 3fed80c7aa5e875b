//! Bounded-concurrency command preset runner
//!
//! Acceptance-test presets run in parallel against the same chain with
//! disjoint signer identities, so one failure must not cancel its siblings:
//! every preset runs to completion and the first failure is reported only
//! after the whole pool drains. Interleaved stdout is told apart purely by
//! the per-line `[timestamp][name]` prefix.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::ProcessError;

/// A named, immutable command invocation with its own wall-clock budget
#[derive(Debug, Clone)]
pub struct CommandPreset {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandPreset {
    fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs every preset with at most `max_concurrency` in flight. All presets
/// run to completion before the first failure, if any, is returned.
pub async fn run_presets(
    presets: Vec<CommandPreset>,
    max_concurrency: usize,
) -> Result<(), ProcessError> {
    let results: Vec<(String, Result<(), ProcessError>)> = stream::iter(presets)
        .map(|preset| async move {
            let name = preset.name.clone();
            (name, run_preset(&preset).await)
        })
        .buffer_unordered(max_concurrency.max(1))
        .collect()
        .await;

    let mut first_failure = None;
    for (name, result) in results {
        match result {
            Ok(()) => tracing::info!("preset '{name}' completed"),
            Err(err) => {
                tracing::error!("preset '{name}' failed: {err}");
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }
    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn run_preset(preset: &CommandPreset) -> Result<(), ProcessError> {
    let mut cmd = Command::new(&preset.program);
    cmd.args(&preset.args)
        .current_dir(&preset.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;

    let name = preset.name.clone();
    let stdout = child.stdout.take();
    let stdout_task = tokio::spawn(async move {
        if let Some(pipe) = stdout {
            let mut lines = BufReader::new(pipe).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let timestamp = Utc::now().format("%H:%M:%S%.6f");
                println!("[{timestamp}][{name}] {line}");
            }
        }
    });
    let stderr = child.stderr.take();
    let stderr_task = tokio::spawn(async move {
        let mut buf = String::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_string(&mut buf).await;
        }
        buf
    });

    let status = match timeout(preset.timeout, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            return Err(ProcessError::CommandTimedOut {
                command: preset.display(),
                timeout: preset.timeout,
            });
        }
    };

    let _ = stdout_task.await;
    let stderr = stderr_task.await.unwrap_or_default();

    if !status.success() {
        return Err(ProcessError::CommandFailed {
            command: preset.display(),
            code: status.code().unwrap_or(-1),
            stderr,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset(name: &str, script: &str, timeout: Duration) -> CommandPreset {
        CommandPreset {
            name: name.to_string(),
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: std::env::temp_dir(),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_all_presets_succeed() {
        let presets = vec![
            preset("one", "echo hello", Duration::from_secs(5)),
            preset("two", "echo world", Duration::from_secs(5)),
        ];
        run_presets(presets, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_sibling_runs_despite_failure() {
        let dir = std::env::temp_dir();
        let marker = dir.join(format!("devnet-runner-marker-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);

        let presets = vec![
            preset("bad", "exit 7", Duration::from_secs(5)),
            preset(
                "good",
                &format!("sleep 0.2 && touch {}", marker.display()),
                Duration::from_secs(5),
            ),
        ];
        let err = run_presets(presets, 2).await.unwrap_err();
        assert!(matches!(err, ProcessError::CommandFailed { code: 7, .. }));
        // The failing preset must not have cancelled its sibling
        assert!(marker.exists());
        let _ = std::fs::remove_file(&marker);
    }

    #[tokio::test]
    async fn test_preset_timeout() {
        let presets = vec![preset("slow", "sleep 5", Duration::from_millis(200))];
        let err = run_presets(presets, 2).await.unwrap_err();
        assert!(matches!(err, ProcessError::CommandTimedOut { .. }));
    }
}
