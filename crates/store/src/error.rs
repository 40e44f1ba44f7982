use thiserror::Error;

/// Failures from the ledger store. Upsert failures are block-scoped (the
/// caller logs and moves to the next block); query failures surface to the
/// HTTP layer as a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("failed to execute batch upsert: {0}")]
    Upsert(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("schema creation failed: {0}")]
    Schema(#[source] sqlx::Error),
}
