//! The ledger store (components F/H): schema management, idempotent batched
//! upsert, and the SQL-level balance/history/range query surface.
//!
//! Backed by PostgreSQL through `sqlx`. The balance aggregation in
//! [`LedgerStore::get_balance`] runs entirely in SQL so it stays atomic with
//! respect to concurrent upserts — it is never pulled client-side and summed
//! in Rust.

mod error;

pub use error::StoreError;

use baseidx_ingest::{EntryType, LedgerEntry};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::time::Duration;

/// Connect timeout mirrored from the original DSN's `connect_timeout=5`.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Balance {
    pub balance: BigDecimal,
    pub tx_count: i64,
}

#[derive(FromRow)]
struct EntryRow {
    hash: String,
    #[sqlx(rename = "type")]
    entry_type: String,
    value: BigDecimal,
    from_address: String,
    to_address: String,
    block_index: String,
    successful: bool,
    timestamp: DateTime<Utc>,
}

impl TryFrom<EntryRow> for LedgerEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let entry_type = EntryType::from_str(&row.entry_type).ok_or_else(|| {
            StoreError::Query(sqlx::Error::Decode(
                format!("unknown entry type {:?} in row {}", row.entry_type, row.hash).into(),
            ))
        })?;
        Ok(LedgerEntry {
            hash: row.hash,
            entry_type,
            value: row.value,
            from: row.from_address,
            to: row.to_address,
            block_index: row.block_index,
            successful: row.successful,
            timestamp: row.timestamp,
        })
    }
}

/// A connection-pooled handle to the Postgres-backed ledger.
#[derive(Clone)]
pub struct LedgerStore {
    pool: PgPool,
}

impl LedgerStore {
    /// Opens a pool against `database_url`, applying the connect timeout
    /// mirrored from the original DSN's `connect_timeout` parameter. A
    /// connection failure here is process-fatal per the error handling
    /// design — callers are expected to propagate it out of `main`.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(StoreError::Connection)?;
        Ok(Self { pool })
    }

    /// Wraps an already-constructed pool (used by callers that build their
    /// own `PgPoolOptions`, and by tests against an ephemeral database).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One-shot schema creation: the single `transactions` table and its
    /// four supporting indexes.
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                hash TEXT PRIMARY KEY,
                type TEXT NOT NULL CHECK (type IN ('transfer', 'call', 'fee')),
                value NUMERIC NOT NULL,
                from_address TEXT NOT NULL,
                to_address TEXT NOT NULL,
                block_index TEXT NOT NULL,
                successful BOOLEAN NOT NULL,
                timestamp TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Schema)?;

        for (name, column) in [
            ("idx_transactions_from", "from_address"),
            ("idx_transactions_to", "to_address"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON transactions ({column})"
            ))
            .execute(&self.pool)
            .await
            .map_err(StoreError::Schema)?;
        }

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_from_ts ON transactions (from_address, timestamp DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Schema)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_transactions_to_ts ON transactions (to_address, timestamp DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(StoreError::Schema)?;

        Ok(())
    }

    /// Batched, idempotent upsert. Runs as a single transaction so the
    /// batch is all-or-nothing; an empty slice is a no-op success.
    pub async fn upsert_batch(&self, entries: Vec<LedgerEntry>) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(StoreError::Upsert)?;

        for entry in &entries {
            sqlx::query(
                r#"
                INSERT INTO transactions
                    (hash, type, value, from_address, to_address, block_index, successful, timestamp)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (hash) DO UPDATE SET
                    type = EXCLUDED.type,
                    value = EXCLUDED.value,
                    from_address = EXCLUDED.from_address,
                    to_address = EXCLUDED.to_address,
                    block_index = EXCLUDED.block_index,
                    successful = EXCLUDED.successful,
                    timestamp = EXCLUDED.timestamp
                "#,
            )
            .bind(&entry.hash)
            .bind(entry.entry_type.as_str())
            .bind(&entry.value)
            .bind(&entry.from)
            .bind(&entry.to)
            .bind(&entry.block_index)
            .bind(entry.successful)
            .bind(entry.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::Upsert)?;
        }

        tx.commit().await.map_err(StoreError::Upsert)?;
        Ok(())
    }

    /// The accounting contract of §4.6, computed entirely in SQL: fee debits
    /// and successful-transfer debits/credits are folded in a single `CASE`
    /// so the result is atomic with respect to concurrent upserts.
    pub async fn get_balance(&self, address: &str) -> Result<Balance, StoreError> {
        let row: (BigDecimal, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(
                    CASE
                        WHEN type = 'fee' AND from_address = $1 THEN -value
                        WHEN successful AND from_address = $1 THEN -value
                        WHEN successful AND to_address = $1 THEN value
                        ELSE 0
                    END
                ), 0) AS balance,
                COUNT(*) AS tx_count
            FROM transactions
            WHERE from_address = $1 OR to_address = $1
            "#,
        )
        .bind(address)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(Balance {
            balance: row.0,
            tx_count: row.1,
        })
    }

    /// Every entry touching `address`, newest first.
    pub async fn get_entries_for(&self, address: &str) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT hash, type, value, from_address, to_address, block_index, successful, timestamp
            FROM transactions
            WHERE from_address = $1 OR to_address = $1
            ORDER BY timestamp DESC
            "#,
        )
        .bind(address)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }

    /// Every entry with `timestamp` in `[start, end]`, newest first.
    pub async fn get_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT hash, type, value, from_address, to_address, block_index, successful, timestamp
            FROM transactions
            WHERE timestamp BETWEEN $1 AND $2
            ORDER BY timestamp DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        rows.into_iter().map(LedgerEntry::try_from).collect()
    }
}

#[async_trait::async_trait]
impl baseidx_ingest::EntrySink for LedgerStore {
    async fn upsert_batch(&self, entries: Vec<LedgerEntry>) -> Result<(), anyhow::Error> {
        LedgerStore::upsert_batch(self, entries).await.map_err(anyhow::Error::from)
    }
}
