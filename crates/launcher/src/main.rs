//! RSK bedrock devnet launcher
//!
//! Deploys the bedrock contracts onto the RSK regtest L1, harvests the
//! resulting chain state, reconciles it into the RSK genesis format, and
//! boots the full two-layer devnet on top.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod allocs;
mod config;
mod deploy;
mod docker;
mod stages;

use config::Paths;

/// Bedrock devnet launcher
#[derive(Parser, Debug)]
#[command(name = "rsk-devnet")]
#[command(about = "Bedrock devnet launcher for the RSK regtest L1", long_about = None)]
struct Args {
    /// Directory of the monorepo
    #[arg(long, default_value = ".")]
    monorepo_dir: PathBuf,

    /// Only create the allocs and exit
    #[arg(long)]
    allocs: bool,

    /// Test the deployment, must already be deployed
    #[arg(long)]
    test: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    worker: Option<WorkerCommand>,
}

/// Internal entry points executed inside isolated worker processes
#[derive(Subcommand, Debug)]
enum WorkerCommand {
    /// Deploy the bedrock contracts against the running deployer node
    #[command(hide = true)]
    DeployWorker,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let monorepo_dir = args
        .monorepo_dir
        .canonicalize()
        .context("resolving monorepo directory")?;
    let paths = Paths::new(&monorepo_dir);

    if let Some(WorkerCommand::DeployWorker) = args.worker {
        // Worker mode: serialize any failure onto stderr for the
        // supervisor to drain, and exit non-zero
        if let Err(err) = deploy::deploy_contracts(&paths).await {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
        return Ok(());
    }

    if args.test {
        tracing::info!("Testing deployed devnet");
        return stages::devnet_test(&paths).await;
    }

    std::fs::create_dir_all(&paths.genesis_dir).context("creating genesis directory")?;

    if args.allocs {
        return allocs::generate_allocs(&paths).await;
    }

    docker::build_images(&paths).await?;

    tracing::info!("Devnet starting");
    stages::devnet_deploy(&paths).await?;
    tracing::info!("Devnet prepared");
    stages::start_prepared_devnet(&paths).await?;
    tracing::info!("Devnet ready.");

    Ok(())
}
