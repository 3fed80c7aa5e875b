//! L1 state harvest
//!
//! Builds the allocation checkpoint by collecting contract dumps and EOA
//! balances from the running deployer chain and merging them into one
//! allocation set, keyed by normalized address.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use devnet_genesis::{
    hex_to_decimal, hex_to_u64, load_dump, merge_allocation, read_json, strip_hex_prefix,
    write_json, AllocationSet,
};
use devnet_proc::run_isolated;
use devnet_rpc::EthClient;
use serde_json::Value;

use crate::config::{l1_endpoint, Paths};
use crate::{deploy, docker};

/// Instantiates the deploy config from its template, optionally refreshing
/// the L1 genesis timestamp to now.
pub fn init_deploy_config(paths: &Paths, update_timestamp: bool) -> Result<()> {
    let mut config: serde_json::Map<String, Value> =
        read_json(&paths.devnet_config_template_path)?;
    if update_timestamp {
        let now = chrono::Utc::now().timestamp();
        config.insert(
            "l1GenesisBlockTimestamp".to_string(),
            Value::String(format!("{now:#x}")),
        );
    }
    write_json(&paths.devnet_config_path, &config)?;
    Ok(())
}

/// Deploys the contracts in an isolated worker and harvests the resulting
/// chain state into the allocs checkpoint. The deployer container comes
/// down on every exit path.
pub async fn generate_allocs(paths: &Paths) -> Result<()> {
    tracing::info!("Generating L1 genesis state");
    init_deploy_config(paths, false)?;

    docker::compose_up(paths, &["l1_deployer"], &[]).await?;

    let result = deploy_and_harvest(paths).await;
    if let Err(err) = docker::compose_down(paths, "l1_deployer").await {
        tracing::error!("failed to stop l1_deployer: {err}");
    }
    result
}

async fn deploy_and_harvest(paths: &Paths) -> Result<()> {
    run_isolated(&deploy::worker_spec(paths)?).await?;
    compose_l1_allocs(paths).await
}

/// Captures the state root once, runs both harvest passes, and writes the
/// checkpoint
pub async fn compose_l1_allocs(paths: &Paths) -> Result<()> {
    let client = EthClient::new(l1_endpoint())?;

    let latest_block = client.latest_block().await?;
    let state_root = latest_block
        .get("stateRoot")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("latest block carries no stateRoot"))?;
    tracing::info!("state root: {state_root}");

    let mut allocs = AllocationSet::new(state_root);
    extract_contract_allocs(paths, &client, &mut allocs).await?;
    extract_eoa_allocs(&client, &mut allocs).await?;

    tracing::info!("Writing allocs to {}", paths.allocs_path.display());
    write_json(&paths.allocs_path, &allocs)?;
    Ok(())
}

/// Contract pass: every address in the address book gets a server-side
/// state dump, which is copied out of the deployer container and merged.
async fn extract_contract_allocs(
    paths: &Paths,
    client: &EthClient,
    allocs: &mut AllocationSet,
) -> Result<()> {
    let address_book: BTreeMap<String, String> = read_json(&paths.addresses_json_path)?;

    for (name, address) in &address_book {
        let account = address.to_lowercase();
        client.dump_state(&account).await?;

        let account = strip_hex_prefix(&account);
        let filename = format!("rskdump-{account}.json");
        docker::copy_from_container(
            paths,
            &format!("l1_deployer:/var/lib/rsk/{filename}"),
            &paths.devnet_dir,
        )
        .await?;

        let dump = load_dump(&paths.devnet_dir, account)?;
        let account_data = dump
            .get(account)
            .ok_or_else(|| anyhow!("dump for {name} has no entry for {account}"))?;
        merge_allocation(allocs, account, account_data)
            .with_context(|| format!("merging contract {name}"))?;
    }
    Ok(())
}

/// EOA pass: balance and transaction count per dev account, hex converted
/// to the decimal/integer forms the merger expects
async fn extract_eoa_allocs(client: &EthClient, allocs: &mut AllocationSet) -> Result<()> {
    let accounts = client.accounts().await?;
    tracing::info!("l1 accounts: {accounts:?}");

    for account in &accounts {
        let balance = client.balance(account).await?;
        let nonce = client.transaction_count(account).await?;
        let account_data = serde_json::json!({
            "balance": hex_to_decimal(&balance)?,
            "nonce": hex_to_u64(&nonce)?,
        });
        tracing::info!("{account} data: {account_data}");
        merge_allocation(allocs, account, &account_data)?;
    }
    Ok(())
}
