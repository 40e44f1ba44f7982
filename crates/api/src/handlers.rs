use axum::extract::{Path, Query, State};
use axum::Json;
use baseidx_ingest::LedgerEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiState};

#[derive(Serialize)]
pub struct HealthBody {
    status: &'static str,
}

pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "OK" })
}

#[derive(Serialize)]
pub struct BalanceBody {
    account: String,
    /// Rendered as a decimal string — wei values exceed JSON's safe integer range.
    balance: String,
    tx_count: i64,
}

pub async fn balance(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceBody>, ApiError> {
    let address = address.to_lowercase();
    let result = state.store.get_balance(&address).await?;
    if result.tx_count == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(Json(BalanceBody {
        account: address,
        balance: result.balance.to_string(),
        tx_count: result.tx_count,
    }))
}

#[derive(Serialize)]
pub struct EntryView {
    hash: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    value: String,
    from: String,
    to: String,
    block_index: String,
    successful: bool,
    timestamp: DateTime<Utc>,
}

impl From<&LedgerEntry> for EntryView {
    fn from(e: &LedgerEntry) -> Self {
        EntryView {
            hash: e.hash.clone(),
            entry_type: e.entry_type.as_str(),
            value: e.value.to_string(),
            from: e.from.clone(),
            to: e.to.clone(),
            block_index: e.block_index.clone(),
            successful: e.successful,
            timestamp: e.timestamp,
        }
    }
}

pub async fn transactions(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<EntryView>>, ApiError> {
    let address = address.to_lowercase();
    let entries = state.store.get_entries_for(&address).await?;
    Ok(Json(entries.iter().map(EntryView::from).collect()))
}

#[derive(Deserialize)]
pub struct RangeParams {
    start: String,
    end: String,
}

pub async fn transactions_in_range(
    State(state): State<ApiState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<EntryView>>, ApiError> {
    let start = parse_rfc3339_utc(&params.start)?;
    let end = parse_rfc3339_utc(&params.end)?;
    if start > end {
        return Err(ApiError::Validation("start must not be after end".to_string()));
    }

    let entries = state.store.get_entries_in_range(start, end).await?;
    Ok(Json(entries.iter().map(EntryView::from).collect()))
}

fn parse_rfc3339_utc(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if !raw.ends_with('Z') {
        return Err(ApiError::Validation(format!(
            "timestamp {raw:?} must be RFC3339 with a Z suffix"
        )));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::Validation(format!("timestamp {raw:?} is not valid RFC3339")))
}
