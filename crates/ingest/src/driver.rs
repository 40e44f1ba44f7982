//! Drives the block processor over a requested set of heights, bounded by
//! the chain head, handing each block's entries to the ledger store.

use baseidx_connector::ChainConnector;
use baseidx_watchlist::Watchlist;

use crate::block_processor::process_block;
use crate::entry::LedgerEntry;

/// Anything the driver can flush a block's entries into. Implemented by
/// `baseidx-store::LedgerStore`; a `Vec`-backed fake is enough for tests.
#[async_trait::async_trait]
pub trait EntrySink: Send + Sync {
    async fn upsert_batch(&self, entries: Vec<LedgerEntry>) -> Result<(), anyhow::Error>;
}

/// Runs the full ingestion pass described in §4.7: sort and dedupe the
/// requested heights, stop at the chain head, process each surviving height
/// independently, and log-and-continue past any single block's failure.
pub async fn run(
    connector: &dyn ChainConnector,
    watchlist: &Watchlist,
    sink: &dyn EntrySink,
    heights: &[u64],
) -> Result<(), anyhow::Error> {
    let mut sorted: Vec<u64> = heights.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let head = connector.get_latest_block().await?;

    for height in sorted {
        if height > head {
            tracing::info!(height, head, "block above chain head, stopping");
            break;
        }

        match process_block(connector, watchlist, height).await {
            Ok(entries) => {
                if entries.is_empty() {
                    continue;
                }
                if let Err(error) = sink.upsert_batch(entries).await {
                    tracing::warn!(height, %error, "failed to persist block, continuing");
                }
            }
            Err(error) => {
                tracing::warn!(height, %error, "block processing failed, continuing");
            }
        }
    }

    Ok(())
}
