//! Recursive depth-first walk of a `debug_traceTransaction` call tree.
//!
//! Only invoked for top-level `call` transactions (§4.3 step 6). The counter
//! `k` is owned by the call stack of a single walk — it is never shared
//! across transactions or made `Sync`, by design: it defines the derived
//! hashes that give internal entries their primary key, and two concurrent
//! walks over the same transaction would race on it.

use baseidx_connector::{ChainConnector, ConnectorError, TraceNode};
use baseidx_hex::{is_zero_value_literal, Hex};
use baseidx_watchlist::Watchlist;
use chrono::{DateTime, Utc};

use crate::entry::{EntryType, LedgerEntry};

/// Fetches the call tree for `origin_hash` and walks it pre-order, emitting
/// one [`LedgerEntry`] per node that transfers value and touches the watchlist.
pub async fn walk_trace(
    connector: &dyn ChainConnector,
    watchlist: &Watchlist,
    origin_hash: &str,
    block_index: &str,
    timestamp: DateTime<Utc>,
) -> Result<Vec<LedgerEntry>, ConnectorError> {
    let root = connector.get_trace(origin_hash).await?;
    let mut out = Vec::new();
    let mut counter: u64 = 0;
    walk_node(
        &root,
        watchlist,
        origin_hash,
        block_index,
        timestamp,
        &mut counter,
        &mut out,
    );
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn walk_node(
    node: &TraceNode,
    watchlist: &Watchlist,
    origin_hash: &str,
    block_index: &str,
    timestamp: DateTime<Utc>,
    counter: &mut u64,
    out: &mut Vec<LedgerEntry>,
) {
    if !is_zero_value_literal(&node.value) {
        match Hex::parse(&node.value) {
            Ok(hex) => {
                let to = node.to.clone().unwrap_or_default();
                if watchlist.contains(&node.from) || watchlist.contains(&to) {
                    *counter += 1;
                    out.push(LedgerEntry {
                        hash: format!("{origin_hash}_internal_{counter}"),
                        entry_type: EntryType::from_input(&node.input),
                        value: hex.as_decimal(),
                        from: node.from.clone(),
                        to,
                        block_index: block_index.to_string(),
                        successful: true,
                        timestamp,
                    });
                }
            }
            Err(error) => {
                tracing::warn!(origin_hash, %error, "skipping trace node with unparsable value");
                return;
            }
        }
    }

    for child in &node.calls {
        walk_node(
            child,
            watchlist,
            origin_hash,
            block_index,
            timestamp,
            counter,
            out,
        );
    }
}
