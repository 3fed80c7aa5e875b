//! docker compose helpers for the ops-bedrock services

use std::path::Path;

use anyhow::Result;
use devnet_proc::{run_command, run_command_output, CommandSpec};

use crate::config::Paths;

fn compose_spec(paths: &Paths) -> CommandSpec {
    CommandSpec::new("docker")
        .cwd(&paths.ops_bedrock_dir)
        .env("PWD", paths.ops_bedrock_dir.display().to_string())
}

/// Brings services up detached, with optional extra environment overlays
pub async fn compose_up(paths: &Paths, services: &[&str], env: &[(&str, &str)]) -> Result<()> {
    let mut spec = compose_spec(paths)
        .args(["compose", "up", "-d"])
        .args(services.iter().copied());
    for (key, value) in env {
        spec = spec.env(*key, *value);
    }
    run_command(&spec).await?;
    Ok(())
}

pub async fn compose_down(paths: &Paths, service: &str) -> Result<()> {
    let spec = compose_spec(paths).args(["compose", "down", service]);
    run_command(&spec).await?;
    Ok(())
}

/// Copies a file out of a running container
pub async fn copy_from_container(paths: &Paths, guest_path: &str, host_path: &Path) -> Result<()> {
    tracing::info!("copying {guest_path} from docker to {}", host_path.display());
    let spec = compose_spec(paths)
        .args(["cp", guest_path])
        .arg(host_path.display().to_string());
    run_command(&spec).await?;
    Ok(())
}

/// Builds the devnet images, stamping them with the current git commit.
/// Skipped entirely when `DEVNET_NO_BUILD=true` (CI loads prebuilt images).
pub async fn build_images(paths: &Paths) -> Result<()> {
    if std::env::var("DEVNET_NO_BUILD").as_deref() == Ok("true") {
        tracing::info!("Skipping docker images build");
        return Ok(());
    }

    let git_commit = run_command_output(&CommandSpec::new("git").args(["rev-parse", "HEAD"]))
        .await?
        .trim()
        .to_string();
    let git_date = run_command_output(&CommandSpec::new("git").args(["show", "-s", "--format=%ct"]))
        .await?
        .trim()
        .to_string();

    tracing::info!("Building docker images for git commit {git_commit} ({git_date})");
    let spec = compose_spec(paths)
        .args(["compose", "build", "--progress", "plain"])
        .args([
            "--build-arg".to_string(),
            format!("GIT_COMMIT={git_commit}"),
            "--build-arg".to_string(),
            format!("GIT_DATE={git_date}"),
        ])
        .env("DOCKER_BUILDKIT", "1")
        .env("COMPOSE_DOCKER_CLI_BUILD", "1");
    run_command(&spec).await?;
    Ok(())
}
