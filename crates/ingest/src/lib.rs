//! The ingestion pipeline: per-block transaction/trace processing (§4.3,
//! §4.4) and the driver that walks a requested set of heights (§4.7).
//!
//! `baseidx-ingest` depends only on [`baseidx_connector::ChainConnector`] and
//! [`baseidx_watchlist::Watchlist`] — it knows nothing about Postgres. The
//! store is reached through the [`driver::EntrySink`] seam, so this crate's
//! own test suite never needs a database.

mod block_processor;
mod entry;
mod error;
mod trace_walker;

pub mod driver;

pub use block_processor::process_block;
pub use driver::{run, EntrySink};
pub use entry::{EntryType, LedgerEntry};
pub use error::IngestError;
