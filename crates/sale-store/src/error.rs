use thiserror::Error;
use uuid::Uuid;

use crate::Version;

/// Errors that can occur when reading or writing sale records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored version did not match the version the caller loaded.
    #[error(
        "Concurrency conflict for sale {sale_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        sale_id: Uuid,
        expected: Version,
        actual: Version,
    },

    /// Another sale already uses this sale number.
    #[error("Sale number already in use: {sale_number}")]
    DuplicateSaleNumber { sale_number: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
