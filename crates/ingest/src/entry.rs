use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

/// The unit the ledger store persists: one transfer, contract call, or fee
/// debit, each touching at least one watched address.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Primary key. `tx.hash`, `{tx.hash}_internal_{k}`, or `{tx.hash}_fee`.
    pub hash: String,
    pub entry_type: EntryType,
    /// Non-negative, in wei.
    pub value: BigDecimal,
    pub from: String,
    /// For `Fee` entries this equals `from` — a sentinel, since fees have no receiver.
    pub to: String,
    /// The block's number in its upstream hex form, carried verbatim.
    pub block_index: String,
    /// For `Fee` entries this is always `true`.
    pub successful: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Transfer,
    Call,
    Fee,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Transfer => "transfer",
            EntryType::Call => "call",
            EntryType::Fee => "fee",
        }
    }

    pub fn from_str(s: &str) -> Option<EntryType> {
        match s {
            "transfer" => Some(EntryType::Transfer),
            "call" => Some(EntryType::Call),
            "fee" => Some(EntryType::Fee),
            _ => None,
        }
    }

    /// A top-level/internal entry's type is decided solely by whether the
    /// transaction carries calldata.
    pub fn from_input(input: &str) -> EntryType {
        if input == "0x" {
            EntryType::Transfer
        } else {
            EntryType::Call
        }
    }
}
