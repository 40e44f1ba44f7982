//! The central per-block algorithm: filter transactions against the
//! watchlist, fetch receipts lazily, and emit one ordered run of
//! [`LedgerEntry`] values per relevant transaction (top-level, internal
//! transfers, fee).

use baseidx_connector::{ChainConnector, ReceiptDto};
use baseidx_hex::Hex;
use baseidx_watchlist::Watchlist;
use chrono::{DateTime, Utc};

use crate::entry::{EntryType, LedgerEntry};
use crate::error::IngestError;
use crate::trace_walker::walk_trace;

/// Runs the block processor for height `height`, returning every
/// [`LedgerEntry`] it derives. A block-fatal failure (unreadable block,
/// unparseable timestamp) is the only case that surfaces as `Err` — all
/// per-transaction and per-fee problems are logged and skipped locally.
pub async fn process_block(
    connector: &dyn ChainConnector,
    watchlist: &Watchlist,
    height: u64,
) -> Result<Vec<LedgerEntry>, IngestError> {
    let block = connector
        .get_block_by_number(height)
        .await
        .map_err(|source| IngestError::BlockFetch { height, source })?;

    let block_ts_hex =
        Hex::parse(&block.timestamp).map_err(|source| IngestError::TimestampParse {
            height,
            raw: block.timestamp.clone(),
            source,
        })?;
    let block_ts_secs = block_ts_hex
        .as_i64()
        .map_err(|source| IngestError::TimestampParse {
            height,
            raw: block.timestamp.clone(),
            source,
        })?;
    let timestamp = DateTime::<Utc>::from_timestamp(block_ts_secs, 0).ok_or_else(|| {
        IngestError::TimestampParse {
            height,
            raw: block.timestamp.clone(),
            source: baseidx_hex::HexError::NotAnI64(block.timestamp.clone()),
        }
    })?;

    let block_index = block.number.clone();
    let mut entries = Vec::new();
    let mut receipts: Option<Vec<ReceiptDto>> = None;

    for tx in &block.transactions {
        let to_ref = tx.to.as_deref().unwrap_or("");
        if !watchlist.contains(&tx.from) && !watchlist.contains(to_ref) {
            continue;
        }

        if receipts.is_none() {
            match connector.get_block_receipts(height).await {
                Ok(fetched) => receipts = Some(fetched),
                Err(error) => {
                    tracing::warn!(height, %error, "failed to fetch block receipts");
                    break;
                }
            }
        }

        let receipt = match receipts
            .as_ref()
            .and_then(|rs| rs.iter().find(|r| r.transaction_hash == tx.hash))
        {
            Some(r) => r,
            None => {
                tracing::warn!(height, tx_hash = %tx.hash, "no receipt found for relevant tx, skipping");
                continue;
            }
        };

        let value = match Hex::parse(&tx.value) {
            Ok(hex) => hex.as_decimal(),
            Err(error) => {
                tracing::warn!(height, tx_hash = %tx.hash, %error, "unparseable tx value, skipping tx");
                continue;
            }
        };

        let entry_type = EntryType::from_input(&tx.input);
        let successful = receipt.status == "0x1";

        entries.push(LedgerEntry {
            hash: tx.hash.clone(),
            entry_type,
            value,
            from: tx.from.clone(),
            to: to_ref.to_string(),
            block_index: block_index.clone(),
            successful,
            timestamp,
        });

        if entry_type == EntryType::Call && successful {
            match walk_trace(connector, watchlist, &tx.hash, &block_index, timestamp).await {
                Ok(mut internal) => entries.append(&mut internal),
                Err(error) => {
                    tracing::warn!(height, tx_hash = %tx.hash, %error, "trace expansion failed, continuing with fee emission");
                }
            }
        }

        match fee_entry(tx_fee_hash(&tx.hash), &tx.from, receipt, &block_index, timestamp) {
            Ok(fee) => entries.push(fee),
            Err(error) => {
                tracing::warn!(height, tx_hash = %tx.hash, %error, "unparseable fee field, skipping fee entry");
            }
        }
    }

    Ok(entries)
}

fn tx_fee_hash(tx_hash: &str) -> String {
    format!("{tx_hash}_fee")
}

fn fee_entry(
    hash: String,
    from: &str,
    receipt: &ReceiptDto,
    block_index: &str,
    timestamp: DateTime<Utc>,
) -> Result<LedgerEntry, baseidx_hex::HexError> {
    let gas_used = Hex::parse(&receipt.gas_used)?.as_decimal();
    let gas_price = Hex::parse(&receipt.effective_gas_price)?.as_decimal();
    let l1_fee = match &receipt.l1_fee {
        Some(raw) => Hex::parse(raw)?.as_decimal(),
        None => bigdecimal::BigDecimal::from(0),
    };

    Ok(LedgerEntry {
        hash,
        entry_type: EntryType::Fee,
        value: gas_price * gas_used + l1_fee,
        from: from.to_string(),
        to: from.to_string(),
        block_index: block_index.to_string(),
        successful: true,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use baseidx_connector::{BlockData, ConnectorError, TraceNode, TransactionDto};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const WATCHED: &str = "0xaa00000000000000000000000000000000000a";
    const OTHER: &str = "0xbb00000000000000000000000000000000000b";

    struct FakeConnector {
        block: BlockData,
        receipts: Mutex<Vec<ReceiptDto>>,
        receipts_calls: Mutex<u32>,
        traces: Mutex<HashMap<String, TraceNode>>,
    }

    #[async_trait]
    impl ChainConnector for FakeConnector {
        async fn get_latest_block(&self) -> Result<u64, ConnectorError> {
            unimplemented!()
        }

        async fn get_block_by_number(&self, _height: u64) -> Result<BlockData, ConnectorError> {
            Ok(self.block.clone())
        }

        async fn get_block_receipts(&self, _height: u64) -> Result<Vec<ReceiptDto>, ConnectorError> {
            *self.receipts_calls.lock().unwrap() += 1;
            Ok(self.receipts.lock().unwrap().clone())
        }

        async fn get_trace(&self, tx_hash: &str) -> Result<TraceNode, ConnectorError> {
            Ok(self.traces.lock().unwrap().get(tx_hash).unwrap().clone())
        }
    }

    fn tx(hash: &str, from: &str, to: &str, value: &str, input: &str) -> TransactionDto {
        TransactionDto {
            from: from.to_string(),
            to: Some(to.to_string()),
            value: value.to_string(),
            input: input.to_string(),
            hash: hash.to_string(),
        }
    }

    fn receipt(hash: &str, from: &str, to: &str, status: &str, l1_fee: Option<&str>) -> ReceiptDto {
        ReceiptDto {
            from: from.to_string(),
            to: to.to_string(),
            status: status.to_string(),
            gas_used: "0x5208".to_string(),
            effective_gas_price: "0x3b9aca00".to_string(),
            transaction_hash: hash.to_string(),
            l1_fee: l1_fee.map(str::to_string),
        }
    }

    // Scenario S1: a simple successful transfer into a watched address.
    #[tokio::test]
    async fn scenario_s1_transfer_in() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT1", OTHER, WATCHED, "0x0de0b6b3a7640000", "0x")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![receipt("0xT1", OTHER, WATCHED, "0x1", None)]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hash, "0xT1");
        assert_eq!(entries[0].entry_type, EntryType::Transfer);
        assert!(entries[0].successful);
        assert_eq!(entries[1].hash, "0xT1_fee");
        assert_eq!(entries[1].entry_type, EntryType::Fee);
        assert_eq!(entries[1].from, OTHER);
        assert_eq!(entries[1].to, OTHER);
        assert!(entries[1].successful);
    }

    // Scenario S2: a failed top-level transfer still settles its fee.
    #[tokio::test]
    async fn scenario_s2_failed_tx_still_pays_fee() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT2", WATCHED, OTHER, "0x0de0b6b3a7640000", "0x")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![receipt("0xT2", WATCHED, OTHER, "0x0", None)]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert!(!entries[0].successful);
        assert_eq!(entries[1].hash, "0xT2_fee");
        assert!(entries[1].successful);
    }

    // Scenario S3: a successful call transaction expands into an internal transfer.
    #[tokio::test]
    async fn scenario_s3_call_with_internal_transfer() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT3", OTHER, "0xcc00000000000000000000000000000000000c", "0x0", "0xabcd")],
        };
        let inner = TraceNode {
            from: "0xcc00000000000000000000000000000000000c".to_string(),
            to: Some(WATCHED.to_string()),
            value: "0x05".to_string(),
            input: "0x".to_string(),
            calls: vec![],
        };
        let root = TraceNode {
            from: OTHER.to_string(),
            to: Some("0xcc00000000000000000000000000000000000c".to_string()),
            value: "0x0".to_string(),
            input: "0xabcd".to_string(),
            calls: vec![inner],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![receipt(
                "0xT3",
                OTHER,
                "0xcc00000000000000000000000000000000000c",
                "0x1",
                None,
            )]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::from([("0xT3".to_string(), root)])),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].hash, "0xT3");
        assert_eq!(entries[1].hash, "0xT3_internal_1");
        assert_eq!(entries[1].from, "0xcc00000000000000000000000000000000000c");
        assert_eq!(entries[2].hash, "0xT3_fee");
    }

    // Scenario S2-variant (open question decided): a failed call never expands its trace.
    #[tokio::test]
    async fn failed_call_never_invokes_trace_walker() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT4", WATCHED, "0xcc00000000000000000000000000000000000c", "0x0", "0xabcd")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![receipt(
                "0xT4",
                WATCHED,
                "0xcc00000000000000000000000000000000000c",
                "0x0",
                None,
            )]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hash, "0xT4");
        assert_eq!(entries[1].hash, "0xT4_fee");
    }

    #[tokio::test]
    async fn l1_fee_absent_defaults_to_zero() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT5", WATCHED, OTHER, "0x01", "0x")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![receipt("0xT5", WATCHED, OTHER, "0x1", None)]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();
        let fee = &entries[1];
        let expected = bigdecimal::BigDecimal::from(0x3b9aca00u64) * bigdecimal::BigDecimal::from(0x5208u64);
        assert_eq!(fee.value, expected);
    }

    #[tokio::test]
    async fn empty_relevant_block_performs_no_receipt_fetch() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT6", OTHER, "0xcc00000000000000000000000000000000000c", "0x01", "0x")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(*connector.receipts_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_receipt_skips_tx_without_fee() {
        let watchlist = Watchlist::new([WATCHED]);
        let block = BlockData {
            number: "0x64".to_string(),
            timestamp: "0x5f5e1000".to_string(),
            transactions: vec![tx("0xT7", WATCHED, OTHER, "0x01", "0x")],
        };
        let connector = FakeConnector {
            block,
            receipts: Mutex::new(vec![]),
            receipts_calls: Mutex::new(0),
            traces: Mutex::new(HashMap::new()),
        };

        let entries = process_block(&connector, &watchlist, 100).await.unwrap();
        assert!(entries.is_empty());
    }
}
