use thiserror::Error;

/// Failure modes of a single chain-connector call. Every variant is
/// block-scoped or tx-scoped at the call site: the driver and block
/// processor log these and move on rather than aborting the run.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("rpc transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc endpoint returned non-success status {0}")]
    NonSuccessStatus(u16),

    #[error("rpc call failed: {method} returned error {code}: {message}")]
    RpcError {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("failed to decode rpc response for {method}: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("rpc field for {method} was not valid hex: {source}")]
    InvalidHexField {
        method: &'static str,
        #[source]
        source: baseidx_hex::HexError,
    },
}
