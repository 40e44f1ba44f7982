//! The production [`ChainConnector`](crate::ChainConnector): JSON-RPC 2.0 over
//! HTTP POST, split across a main URL (the three `eth_*` methods) and a debug
//! URL (`debug_traceTransaction`), per §6.2 of the design.

use std::time::Duration;

use async_trait::async_trait;
use baseidx_hex::Hex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::{
    dto::RpcEnvelope, BlockData, ChainConnector, ConnectorError, ReceiptDto, TraceNode,
};

/// Default per-request timeout, per §5 ("RPC per-request timeouts, implementation
/// choice, ≥ 10 s recommended").
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct JsonRpcConnector {
    client: reqwest::Client,
    base_url: Url,
    debug_url: Url,
}

impl JsonRpcConnector {
    pub fn new(base_url: Url, debug_url: Url) -> Result<JsonRpcConnector, ConnectorError> {
        Self::with_timeout(base_url, debug_url, DEFAULT_RPC_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: Url,
        debug_url: Url,
        timeout: Duration,
    ) -> Result<JsonRpcConnector, ConnectorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(JsonRpcConnector {
            client,
            base_url,
            debug_url,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: &Url,
        method: &'static str,
        params: Value,
    ) -> Result<T, ConnectorError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        debug!(method, %url, "posting rpc request");
        let response = self.client.post(url.clone()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::NonSuccessStatus(status.as_u16()));
        }
        let raw = response.bytes().await?;
        let envelope: RpcEnvelope<T> = serde_json::from_slice(&raw)
            .map_err(|source| ConnectorError::Decode { method, source })?;
        envelope
            .into_result()
            .map_err(|(code, message)| ConnectorError::RpcError {
                method,
                code,
                message,
            })
    }

    fn parse_hex_field(method: &'static str, raw: &str) -> Result<Hex, ConnectorError> {
        Hex::parse(raw).map_err(|source| ConnectorError::InvalidHexField { method, source })
    }
}

#[async_trait]
impl ChainConnector for JsonRpcConnector {
    async fn get_latest_block(&self) -> Result<u64, ConnectorError> {
        let raw: String = self
            .call(&self.base_url, "eth_blockNumber", json!([]))
            .await?;
        Self::parse_hex_field("eth_blockNumber", &raw)?
            .as_u64()
            .map_err(|source| ConnectorError::InvalidHexField {
                method: "eth_blockNumber",
                source,
            })
    }

    async fn get_block_by_number(&self, height: u64) -> Result<BlockData, ConnectorError> {
        let params = json!([Hex::from_u64(height).to_string(), true]);
        self.call(&self.base_url, "eth_getBlockByNumber", params)
            .await
    }

    async fn get_block_receipts(&self, height: u64) -> Result<Vec<ReceiptDto>, ConnectorError> {
        let params = json!([Hex::from_u64(height).to_string()]);
        self.call(&self.base_url, "eth_getBlockReceipts", params)
            .await
    }

    async fn get_trace(&self, tx_hash: &str) -> Result<TraceNode, ConnectorError> {
        let params = json!([
            tx_hash,
            {
                "tracer": "callTracer",
                "tracerConfig": { "onlyTopLevel": false },
            }
        ]);
        self.call(&self.debug_url, "debug_traceTransaction", params)
            .await
    }
}
