use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "baseidx", author = "danilevy1212", about = "Per-account indexer for an EVM-compatible L2 chain")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Creates the ledger schema. Safe to run repeatedly (`CREATE TABLE IF NOT EXISTS`).
    CreateSchema,
    /// Runs the ingestion pipeline once over the configured `BLOCKS`, then exits.
    Index,
    /// Serves the read-only HTTP surface against the ledger store.
    Serve,
}
