//! Launcher configuration
//!
//! All filesystem locations derive once from the monorepo root and travel
//! as an explicit struct; no component reads ambient global state.

use std::path::{Path, PathBuf};

pub const HOST: &str = "127.0.0.1";
pub const L1_PORT: u16 = 8545;
pub const L2_PORT: u16 = 9545;

pub fn l1_endpoint() -> String {
    format!("http://{HOST}:{L1_PORT}")
}

pub fn l2_endpoint() -> String {
    format!("http://{HOST}:{L2_PORT}")
}

/// Every path the pipeline touches
#[derive(Debug, Clone)]
pub struct Paths {
    pub monorepo_dir: PathBuf,
    pub devnet_dir: PathBuf,
    pub contracts_bedrock_dir: PathBuf,
    pub deployment_dir: PathBuf,
    /// Address book written by the deploy script: contract name -> address
    pub l1_deployments_path: PathBuf,
    pub devnet_config_path: PathBuf,
    pub devnet_config_template_path: PathBuf,
    pub op_node_dir: PathBuf,
    pub ops_bedrock_dir: PathBuf,
    pub ops_chain_ops_dir: PathBuf,
    pub sdk_dir: PathBuf,
    pub genesis_dir: PathBuf,
    pub genesis_l1_path: PathBuf,
    pub genesis_rsk_path: PathBuf,
    pub genesis_l2_path: PathBuf,
    /// Allocation checkpoint; its presence skips the whole harvest on re-run
    pub allocs_path: PathBuf,
    pub addresses_json_path: PathBuf,
    pub rollup_config_path: PathBuf,
    /// Static RSK regtest genesis used as the conversion defaults
    pub rsk_default_genesis_path: PathBuf,
}

impl Paths {
    pub fn new(monorepo_dir: &Path) -> Self {
        let monorepo_dir = monorepo_dir.to_path_buf();
        let devnet_dir = monorepo_dir.join(".devnet");
        let contracts_bedrock_dir = monorepo_dir.join("packages").join("contracts-bedrock");
        let deployment_dir = contracts_bedrock_dir.join("deployments").join("regtest");
        let deploy_config_dir = contracts_bedrock_dir.join("deploy-config");
        let ops_bedrock_dir = monorepo_dir.join("ops-bedrock");
        let genesis_dir = devnet_dir.join("genesis");

        Self {
            l1_deployments_path: deployment_dir.join(".deploy"),
            devnet_config_path: deploy_config_dir.join("regtest.json"),
            devnet_config_template_path: deploy_config_dir.join("regtest-template.json"),
            op_node_dir: monorepo_dir.join("op-node"),
            ops_chain_ops_dir: monorepo_dir.join("op-chain-ops"),
            sdk_dir: monorepo_dir.join("packages").join("sdk"),
            genesis_l1_path: genesis_dir.join("l1.json"),
            genesis_rsk_path: genesis_dir.join("rsk-dev.json"),
            genesis_l2_path: genesis_dir.join("l2.json"),
            allocs_path: devnet_dir.join("allocs-l1.json"),
            addresses_json_path: devnet_dir.join("addresses.json"),
            rollup_config_path: devnet_dir.join("rollup.json"),
            rsk_default_genesis_path: ops_bedrock_dir.join("rsk-dev.json"),
            monorepo_dir,
            devnet_dir,
            contracts_bedrock_dir,
            deployment_dir,
            ops_bedrock_dir,
            genesis_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_monorepo_root() {
        let paths = Paths::new(Path::new("/work/monorepo"));
        assert_eq!(
            paths.allocs_path,
            PathBuf::from("/work/monorepo/.devnet/allocs-l1.json")
        );
        assert_eq!(
            paths.genesis_rsk_path,
            PathBuf::from("/work/monorepo/.devnet/genesis/rsk-dev.json")
        );
        assert_eq!(
            paths.devnet_config_template_path,
            PathBuf::from("/work/monorepo/packages/contracts-bedrock/deploy-config/regtest-template.json")
        );
        assert_eq!(
            paths.rsk_default_genesis_path,
            PathBuf::from("/work/monorepo/ops-bedrock/rsk-dev.json")
        );
    }
}
