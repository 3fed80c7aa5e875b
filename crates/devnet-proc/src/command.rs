//! Single command execution with environment overlays and timeouts

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::error::ProcessError;

/// One external tool invocation. The environment map is overlaid on top of
/// the inherited process environment, so caller-supplied keys win.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Human-readable command line for logs and error messages
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Runs a command to completion, streaming its stdout to the launcher's own.
/// Non-zero exit yields [`ProcessError::CommandFailed`] with the captured
/// stderr; an elapsed timeout kills the child and yields
/// [`ProcessError::CommandTimedOut`].
pub async fn run_command(spec: &CommandSpec) -> Result<(), ProcessError> {
    run_inner(spec, false).await.map(|_| ())
}

/// Like [`run_command`] but captures and returns the child's stdout.
pub async fn run_command_output(spec: &CommandSpec) -> Result<String, ProcessError> {
    run_inner(spec, true).await
}

async fn run_inner(spec: &CommandSpec, capture_stdout: bool) -> Result<String, ProcessError> {
    tracing::debug!("running: {}", spec.display());

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);
    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }
    // Overlay on top of the inherited environment; caller keys win
    cmd.envs(&spec.env);
    cmd.stdin(Stdio::null());
    cmd.stderr(Stdio::piped());
    if capture_stdout {
        cmd.stdout(Stdio::piped());
    }
    // The child must not outlive the launcher on any exit path
    cmd.kill_on_drop(true);

    let mut child = cmd.spawn()?;

    let stderr_task = child.stderr.take().map(|mut pipe| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf).await;
            buf
        })
    });
    let stdout_task = child.stdout.take().map(|mut pipe| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf).await;
            buf
        })
    });

    let status = wait_with_timeout(&mut child, spec).await?;

    let stderr = match stderr_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };
    let stdout = match stdout_task {
        Some(task) => task.await.unwrap_or_default(),
        None => String::new(),
    };

    if !status.success() {
        return Err(ProcessError::CommandFailed {
            command: spec.display(),
            code: status.code().unwrap_or(-1),
            stderr,
        });
    }
    if !stderr.is_empty() {
        tracing::debug!("stderr of '{}': {}", spec.display(), stderr.trim_end());
    }
    Ok(stdout)
}

async fn wait_with_timeout(
    child: &mut Child,
    spec: &CommandSpec,
) -> Result<std::process::ExitStatus, ProcessError> {
    match spec.timeout {
        Some(budget) => match timeout(budget, child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                Err(ProcessError::CommandTimedOut {
                    command: spec.display(),
                    timeout: budget,
                })
            }
        },
        None => Ok(child.wait().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let spec = CommandSpec::new("true");
        run_command(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_env_overlay_wins() {
        // The overlaid value must shadow whatever the test process inherited
        std::env::set_var("DEVNET_PROC_TEST_VAR", "inherited");
        let spec = CommandSpec::new("sh")
            .args(["-c", "test \"$DEVNET_PROC_TEST_VAR\" = overlay"])
            .env("DEVNET_PROC_TEST_VAR", "overlay");
        run_command(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_carries_stderr_and_code() {
        let spec = CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]);
        let err = run_command(&spec).await.unwrap_err();
        match err {
            ProcessError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "sleep 5"])
            .timeout(Duration::from_millis(200));
        let err = run_command(&spec).await.unwrap_err();
        assert!(matches!(err, ProcessError::CommandTimedOut { .. }));
    }

    #[tokio::test]
    async fn test_captured_stdout() {
        let spec = CommandSpec::new("sh").args(["-c", "printf hello"]);
        let out = run_command_output(&spec).await.unwrap();
        assert_eq!(out, "hello");
    }
}
