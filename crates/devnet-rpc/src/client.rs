//! HTTP JSON-RPC client for the L1 and L2 devnet nodes

use jsonrpsee::core::client::{ClientT, Error as ClientError};
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;

use crate::error::RpcError;

/// Thin client over the calls the devnet pipeline consumes
#[derive(Debug, Clone)]
pub struct EthClient {
    endpoint: String,
    http: HttpClient,
}

impl EthClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        let endpoint = endpoint.into();
        let http = HttpClientBuilder::default()
            .build(&endpoint)
            .map_err(|err| RpcError::Transport(err.to_string()))?;
        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Minimal liveness call
    pub async fn chain_id(&self) -> Result<String, RpcError> {
        self.request("eth_chainId", rpc_params![]).await
    }

    /// The node's unlocked dev accounts
    pub async fn accounts(&self) -> Result<Vec<String>, RpcError> {
        tracing::info!("fetching eth_accounts from {}", self.endpoint);
        self.request("eth_accounts", rpc_params![]).await
    }

    /// Balance as a hex string
    pub async fn balance(&self, account: &str) -> Result<String, RpcError> {
        tracing::info!("fetching balance for {account}");
        self.request("eth_getBalance", rpc_params![account]).await
    }

    /// Transaction count at the latest block, as a hex string
    pub async fn transaction_count(&self, account: &str) -> Result<String, RpcError> {
        tracing::info!("fetching tx count for {account}");
        self.request("eth_getTransactionCount", rpc_params![account, "latest"])
            .await
    }

    /// The latest block with full transaction objects
    pub async fn latest_block(&self) -> Result<serde_json::Value, RpcError> {
        tracing::info!("fetching latest block from {}", self.endpoint);
        self.request("eth_getBlockByNumber", rpc_params!["latest", true])
            .await
    }

    /// Triggers a server-side state dump for `account`. The dump lands as a
    /// file on the node's filesystem; the inline response carries no state.
    pub async fn dump_state(&self, account: &str) -> Result<(), RpcError> {
        tracing::info!("requesting state dump for account {account}");
        let response: serde_json::Value = self
            .request("ext_dumpState", rpc_params![account, true, true])
            .await?;
        tracing::debug!("ext_dumpState response: {response}");
        Ok(())
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: ArrayParams,
    ) -> Result<R, RpcError> {
        self.http
            .request(method, params)
            .await
            .map_err(|err| classify(method, err))
    }
}

fn classify(method: &'static str, err: ClientError) -> RpcError {
    match err {
        ClientError::Call(object) => RpcError::Endpoint {
            method,
            message: object.to_string(),
        },
        other => RpcError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_valid_url() {
        assert!(EthClient::new("http://127.0.0.1:8545").is_ok());
        assert!(EthClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let client = EthClient::new("http://127.0.0.1:1").unwrap();
        let err = client.chain_id().await.unwrap_err();
        assert!(err.is_transient());
    }
}
