//! Stage sequencing against filesystem checkpoints
//!
//! Each stage checks for its output artifact before regenerating it, so a
//! re-run resumes where the previous one stopped. The existence checks are
//! plain `Path::exists`; one orchestrator per working directory at a time.

use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use devnet_genesis::{convert_genesis, read_json, write_json};
use devnet_proc::{run_command, run_presets, CommandPreset, CommandSpec};
use devnet_rpc::{wait_for_port, wait_for_rpc, EthClient};
use serde_json::{Map, Value};
use tokio::time::sleep;

use crate::config::{l1_endpoint, l2_endpoint, Paths, HOST, L1_PORT, L2_PORT};
use crate::{allocs, docker};

/// Prepares the devnet: allocation harvest, L1 genesis, RSK genesis
pub async fn devnet_deploy(paths: &Paths) -> Result<()> {
    if paths.genesis_l1_path.exists() {
        tracing::info!("L1 genesis already generated.");
    } else {
        tracing::info!("Generating L1 genesis.");
        if !paths.allocs_path.exists() {
            allocs::generate_allocs(paths).await?;
        }

        // The allocs were harvested against the template timestamp; the L1
        // genesis wants a current one or CI flakes on stale timestamps.
        tracing::info!("Updating timestamp in the config");
        allocs::init_deploy_config(paths, true)?;

        run_command(
            &CommandSpec::new("go")
                .args(["run", "cmd/main.go", "genesis", "l1"])
                .arg("--deploy-config")
                .arg(paths.devnet_config_path.display().to_string())
                .arg("--l1-allocs")
                .arg(paths.allocs_path.display().to_string())
                .arg("--l1-deployments")
                .arg(paths.addresses_json_path.display().to_string())
                .arg("--outfile.l1")
                .arg(paths.genesis_l1_path.display().to_string())
                .cwd(&paths.op_node_dir),
        )
        .await?;
    }

    write_rsk_genesis_file(paths)
}

/// Reconciles the generated L1 genesis into the RSK regtest genesis format
pub fn write_rsk_genesis_file(paths: &Paths) -> Result<()> {
    if !paths.genesis_l1_path.is_file() {
        bail!("no L1 genesis file at {}", paths.genesis_l1_path.display());
    }

    tracing::info!("Merging generated genesis file with RSK regtest default");
    let defaults: Map<String, Value> = read_json(&paths.rsk_default_genesis_path)?;
    let generated: Map<String, Value> = read_json(&paths.genesis_l1_path)?;

    let converted = convert_genesis(&generated, &defaults)?;
    write_json(&paths.genesis_rsk_path, &converted)?;
    Ok(())
}

/// Boots the prepared devnet: L1, L2 genesis, L2, rollup services
pub async fn start_prepared_devnet(paths: &Paths) -> Result<()> {
    tracing::info!("Starting L1.");
    docker::compose_up(paths, &["l1"], &[]).await?;
    wait_for_port(HOST, L1_PORT, 10, Duration::from_secs(1)).await?;
    let l1 = EthClient::new(l1_endpoint())?;
    wait_for_rpc(&l1).await;

    if paths.genesis_l2_path.exists() {
        tracing::info!("L2 genesis and rollup configs already generated.");
    } else {
        tracing::info!("Generating L2 genesis and rollup configs.");
        run_command(
            &CommandSpec::new("go")
                .args(["run", "cmd/main.go", "genesis", "l2"])
                .arg("--l1-rpc")
                .arg(l1_endpoint())
                .arg("--deploy-config")
                .arg(paths.devnet_config_path.display().to_string())
                .arg("--deployment-dir")
                .arg(paths.deployment_dir.display().to_string())
                .arg("--outfile.l2")
                .arg(paths.genesis_l2_path.display().to_string())
                .arg("--outfile.rollup")
                .arg(paths.rollup_config_path.display().to_string())
                .cwd(&paths.op_node_dir),
        )
        .await?;
    }

    let rollup_config: Map<String, Value> = read_json(&paths.rollup_config_path)?;
    let addresses: Map<String, Value> = read_json(&paths.addresses_json_path)?;

    // The L2 genesis file may still be flushing when the generator exits;
    // give it time before the node reads it
    tracing::debug!("settling before L2 start");
    sleep(Duration::from_secs(10)).await;

    tracing::info!("Bringing up L2.");
    docker::compose_up(paths, &["l2"], &[]).await?;
    wait_for_port(HOST, L2_PORT, 10, Duration::from_secs(1)).await?;
    let l2 = EthClient::new(l2_endpoint())?;
    wait_for_rpc(&l2).await;

    let l2_output_oracle = addresses
        .get("L2OutputOracleProxy")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("address book has no L2OutputOracleProxy"))?;
    tracing::info!("Using L2OutputOracle {l2_output_oracle}");
    let batch_inbox_address = rollup_config
        .get("batch_inbox_address")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("rollup config has no batch_inbox_address"))?;
    tracing::info!("Using batch inbox {batch_inbox_address}");

    tracing::info!("Bringing up `op-node`, `op-proposer` and `op-batcher`.");
    docker::compose_up(
        paths,
        &["op-node", "op-proposer", "op-batcher"],
        &[
            ("L2OO_ADDRESS", l2_output_oracle),
            ("SEQUENCER_BATCH_INBOX_ADDRESS", batch_inbox_address),
        ],
    )
    .await?;

    tracing::info!("Bringing up `artifact-server`");
    docker::compose_up(paths, &["artifact-server"], &[]).await?;

    Ok(())
}

/// Acceptance tests against the running devnet
pub async fn devnet_test(paths: &Paths) -> Result<()> {
    // Check the L2 config first
    run_command(
        &CommandSpec::new("go")
            .args(["run", "cmd/check-l2/main.go"])
            .arg("--l2-rpc-url")
            .arg(l2_endpoint())
            .arg("--l1-rpc-url")
            .arg(l1_endpoint())
            .cwd(&paths.ops_chain_ops_dir),
    )
    .await?;

    // Different signers, so nonce management does not conflict between the
    // concurrent presets; no devnet system addresses, to keep fee
    // estimation and nonce values realistic
    let addresses_json = paths.addresses_json_path.display().to_string();
    let presets = vec![
        CommandPreset {
            name: "erc20-test".to_string(),
            program: "npx".to_string(),
            args: [
                "hardhat",
                "deposit-erc20",
                "--network",
                "regtest",
                "--l1-contracts-json-path",
                addresses_json.as_str(),
                "--signer-index",
                "14",
            ]
            .map(String::from)
            .to_vec(),
            cwd: paths.sdk_dir.clone(),
            timeout: Duration::from_secs(8 * 60),
        },
        CommandPreset {
            name: "eth-test".to_string(),
            program: "npx".to_string(),
            args: [
                "hardhat",
                "deposit-eth",
                "--network",
                "regtest",
                "--l1-contracts-json-path",
                addresses_json.as_str(),
                "--signer-index",
                "15",
            ]
            .map(String::from)
            .to_vec(),
            cwd: paths.sdk_dir.clone(),
            timeout: Duration::from_secs(8 * 60),
        },
    ];
    run_presets(presets, 2).await?;
    Ok(())
}
