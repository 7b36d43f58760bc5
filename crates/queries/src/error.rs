//! Query error types.

use common::SaleId;
use domain::ErrorKind;
use sale_store::StoreError;
use thiserror::Error;

/// Errors that can occur while answering queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No sale exists with this id.
    #[error("Sale not found: {0}")]
    NotFound(SaleId),

    /// Page number or page size out of range.
    #[error("Invalid page {page} with page size {page_size} (page >= 1, 1 <= page size <= {max})", max = crate::MAX_PAGE_SIZE)]
    InvalidPage { page: u32, page_size: u32 },

    /// The date range ends before it starts.
    #[error("Invalid date range: from is after to")]
    InvalidDateRange,

    /// An error occurred in the sale store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be read.
    #[error("Invalid stored record for sale {sale_id}: {reason}")]
    InvalidRecord { sale_id: SaleId, reason: String },
}

impl QueryError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::NotFound(_) => ErrorKind::NotFound,
            QueryError::InvalidPage { .. } | QueryError::InvalidDateRange => ErrorKind::Validation,
            QueryError::Store(_) | QueryError::InvalidRecord { .. } => ErrorKind::Persistence,
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
