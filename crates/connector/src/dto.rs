//! Wire types for the four upstream JSON-RPC methods.
//!
//! Addresses are lowercased the moment they're deserialized — this is the
//! second of the two address-casing chokepoints (the first is
//! `Watchlist::new`). Everything downstream of this module treats `from`/`to`
//! fields as already-lowercase.

use serde::{Deserialize, Deserializer};

fn lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.to_lowercase())
}

fn lowercase_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|o| o.map(|s| s.to_lowercase()))
}

/// `eth_getBlockByNumber` result.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
    pub number: String,
    pub timestamp: String,
    #[serde(default)]
    pub transactions: Vec<TransactionDto>,
}

/// One entry of `BlockData::transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDto {
    #[serde(deserialize_with = "lowercase")]
    pub from: String,
    /// Absent for contract-creation transactions.
    #[serde(default, deserialize_with = "lowercase_opt")]
    pub to: Option<String>,
    pub value: String,
    pub input: String,
    pub hash: String,
}

/// One entry of `eth_getBlockReceipts`'s result array.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptDto {
    #[serde(deserialize_with = "lowercase")]
    pub from: String,
    #[serde(deserialize_with = "lowercase")]
    pub to: String,
    /// `"0x1"` succeeded, anything else (including `"0x0"`) failed.
    pub status: String,
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    #[serde(rename = "effectiveGasPrice")]
    pub effective_gas_price: String,
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Absent for some system-level transactions.
    #[serde(rename = "l1Fee", default)]
    pub l1_fee: Option<String>,
}

/// One node of the recursive `debug_traceTransaction` `callTracer` output.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceNode {
    #[serde(deserialize_with = "lowercase")]
    pub from: String,
    /// Absent for contract-creation calls.
    #[serde(default, deserialize_with = "lowercase_opt")]
    pub to: Option<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub calls: Vec<TraceNode>,
}

/// Generic `{"result": T}` envelope shared by all four methods, with an
/// alternate `{"error": {...}}` arm for JSON-RPC level failures.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RpcEnvelope<T> {
    Ok { result: T },
    Err { error: RpcErrorPayload },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorPayload {
    pub code: i64,
    pub message: String,
}

impl<T> RpcEnvelope<T> {
    pub(crate) fn into_result(self) -> Result<T, (i64, String)> {
        match self {
            RpcEnvelope::Ok { result } => Ok(result),
            RpcEnvelope::Err { error } => Err((error.code, error.message)),
        }
    }
}
