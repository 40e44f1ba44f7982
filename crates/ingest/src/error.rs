use baseidx_connector::ConnectorError;
use thiserror::Error;

/// Block-fatal failures: the whole block is dropped, logged, and the driver
/// moves on to the next height. Per-transaction and per-fee failures never
/// reach this type — they're recovered locally inside the block processor.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to fetch block {height}: {source}")]
    BlockFetch { height: u64, source: ConnectorError },

    #[error("block {height} has an unparseable timestamp {raw:?}: {source}")]
    TimestampParse {
        height: u64,
        raw: String,
        source: baseidx_hex::HexError,
    },
}
