//! Typed access to the four upstream JSON-RPC methods the indexer depends on.
//!
//! [`ChainConnector`] is the seam the block processor and driver are written
//! against; [`http::JsonRpcConnector`] is the only production implementation,
//! but tests substitute an in-memory fake (see `baseidx-ingest`'s test suite).

mod dto;
mod error;
pub mod http;

pub use dto::{BlockData, ReceiptDto, TraceNode, TransactionDto};
pub use error::ConnectorError;

use async_trait::async_trait;

/// The chain connector's contract: four calls, all block- or tx-scoped, all
/// fallible in a way the caller is expected to log and recover from.
#[async_trait]
pub trait ChainConnector: Send + Sync {
    /// `eth_blockNumber` — the current chain head.
    async fn get_latest_block(&self) -> Result<u64, ConnectorError>;

    /// `eth_getBlockByNumber(height, full=true)`.
    async fn get_block_by_number(&self, height: u64) -> Result<BlockData, ConnectorError>;

    /// `eth_getBlockReceipts(height)`.
    async fn get_block_receipts(&self, height: u64) -> Result<Vec<ReceiptDto>, ConnectorError>;

    /// `debug_traceTransaction(tx_hash, {tracer: callTracer, ...})`.
    async fn get_trace(&self, tx_hash: &str) -> Result<TraceNode, ConnectorError>;
}
