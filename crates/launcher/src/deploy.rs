//! Bedrock contract deployment against the L1 deployer node
//!
//! This whole module runs inside the isolated worker process spawned by
//! [`devnet_proc::run_isolated`]; forge and cast mutate enough global state
//! that the orchestrator keeps them out of its own process.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use devnet_proc::{run_command, CommandSpec};
use devnet_rpc::{wait_for_port, wait_for_rpc, EthClient};

use crate::config::{l1_endpoint, Paths, HOST, L1_PORT};

/// Well-known create2 deployer account and its presigned deployment
/// transaction (same on every chain)
const CREATE2_DEPLOYER_ADDRESS: &str = "0x3fAB184622Dc19b6109349B94811493BF2a45362";
const CREATE2_DEPLOYER_TX: &str = "0xf8a58085174876e800830186a08080b853604580600e600039806000f350fe7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe03601600081602082378035828234f58015156039578182fd5b8082525050506014600cf31ba02222222222222222222222222222222222222222222222222222222222222222a02222222222222222222222222222222222222222222222222222222222222222";

const DEPLOY_SCRIPT: &str = "scripts/Deploy.s.sol:Deploy";

/// The worker invocation of the launcher itself, used by the supervisor
pub fn worker_spec(paths: &Paths) -> Result<CommandSpec> {
    let exe = std::env::current_exe().context("cannot locate launcher executable")?;
    Ok(CommandSpec::new(exe.display().to_string()).args([
        "--monorepo-dir".to_string(),
        paths.monorepo_dir.display().to_string(),
        "deploy-worker".to_string(),
    ]))
}

/// Deploys the bedrock contracts and records the address book
pub async fn deploy_contracts(paths: &Paths) -> Result<()> {
    wait_for_port(HOST, L1_PORT, 10, Duration::from_secs(1)).await?;
    let client = EthClient::new(l1_endpoint())?;
    wait_for_rpc(&client).await;

    let accounts = client.accounts().await?;
    let account = accounts
        .first()
        .ok_or_else(|| anyhow!("no unlocked accounts on the deployer node"))?;
    tracing::info!("Deploying with {account}");

    let endpoint = l1_endpoint();

    // Send some ether to the create2 deployer account
    run_command(
        &CommandSpec::new("cast")
            .args([
                "send",
                "--from",
                account.as_str(),
                "--rpc-url",
                endpoint.as_str(),
                "--unlocked",
                "--value",
                "1ether",
                CREATE2_DEPLOYER_ADDRESS,
                "--legacy",
            ])
            .cwd(&paths.contracts_bedrock_dir),
    )
    .await?;

    // Deploy the create2 deployer
    run_command(
        &CommandSpec::new("cast")
            .args(["publish", "--rpc-url", endpoint.as_str(), CREATE2_DEPLOYER_TX])
            .cwd(&paths.contracts_bedrock_dir),
    )
    .await?;

    run_command(
        &CommandSpec::new("forge")
            .args([
                "script",
                DEPLOY_SCRIPT,
                "-vvv",
                "--legacy",
                "--slow",
                "--sender",
                account.as_str(),
                "--rpc-url",
                endpoint.as_str(),
                "--broadcast",
                "--unlocked",
            ])
            .cwd(&paths.contracts_bedrock_dir),
    )
    .await?;

    std::fs::copy(&paths.l1_deployments_path, &paths.addresses_json_path)
        .context("copying deployed addresses into .devnet")?;

    tracing::info!("Syncing contracts.");
    run_command(
        &CommandSpec::new("forge")
            .args([
                "script",
                DEPLOY_SCRIPT,
                "-vvv",
                "--legacy",
                "--sig",
                "sync()",
                "--rpc-url",
                endpoint.as_str(),
            ])
            .cwd(&paths.contracts_bedrock_dir),
    )
    .await?;

    Ok(())
}
