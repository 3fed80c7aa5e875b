//! Liveness probes for devnet nodes

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::client::EthClient;
use crate::error::RpcError;

/// Probes a raw TCP port with a bounded retry budget. The connection is
/// closed as soon as it succeeds; exhausting the budget is fatal.
pub async fn wait_for_port(
    host: &str,
    port: u16,
    retries: u32,
    interval: Duration,
) -> Result<(), RpcError> {
    for _ in 0..retries {
        tracing::info!("trying {host}:{port}");
        match TcpStream::connect((host, port)).await {
            Ok(stream) => {
                drop(stream);
                tracing::info!("connected {host}:{port}");
                return Ok(());
            }
            Err(_) => sleep(interval).await,
        }
    }
    Err(RpcError::PortUnreachable {
        host: host.to_string(),
        port,
        retries,
    })
}

/// Waits until the JSON-RPC endpoint answers an `eth_chainId` call.
///
/// Devnet startup time is not bounded in advance, so this retries forever
/// with a fixed one-second backoff. Any transport failure just means "not
/// ready yet"; an endpoint that answers at the HTTP level counts as ready
/// even if the body is a JSON-RPC error.
pub async fn wait_for_rpc(client: &EthClient) {
    tracing::info!("waiting for rpc server at {}", client.endpoint());
    loop {
        match client.chain_id().await {
            Ok(_) => break,
            Err(err) if !err.is_transient() => break,
            Err(_) => {
                tracing::info!("waiting for rpc server at {}", client.endpoint());
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
    tracing::info!("rpc server at {} ready", client.endpoint());
}
