//! Domain error types.

use common::SaleId;
use sale_store::StoreError;
use thiserror::Error;

use crate::sale::SaleError;

/// Broad category of a failure, used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Never retried.
    Validation,
    /// Unknown sale or item.
    NotFound,
    /// Transition attempted from the wrong or a terminal state.
    InvalidState,
    /// The sale changed since it was loaded.
    Conflict,
    /// Storage failure, propagated unchanged.
    Persistence,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Persistence => "persistence",
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The sale aggregate rejected the operation.
    #[error("Sale error: {0}")]
    Sale(#[from] SaleError),

    /// No sale exists with this id.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// An error occurred in the sale store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be turned back into a sale.
    #[error("Invalid stored record for sale {sale_id}: {reason}")]
    InvalidRecord { sale_id: SaleId, reason: String },
}

impl DomainError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Sale(err) => err.kind(),
            DomainError::SaleNotFound(_) => ErrorKind::NotFound,
            DomainError::Store(
                StoreError::ConcurrencyConflict { .. } | StoreError::DuplicateSaleNumber { .. },
            ) => ErrorKind::Conflict,
            DomainError::Store(_) | DomainError::InvalidRecord { .. } => ErrorKind::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::SaleStatus;
    use sale_store::Version;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(
            DomainError::from(SaleError::NoItems).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DomainError::from(SaleError::InvalidStateTransition {
                current_status: SaleStatus::Completed,
                action: "cancel",
            })
            .kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            DomainError::SaleNotFound(SaleId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DomainError::from(StoreError::ConcurrencyConflict {
                sale_id: uuid::Uuid::new_v4(),
                expected: Version::first(),
                actual: Version::new(2),
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DomainError::from(StoreError::DuplicateSaleNumber {
                sale_number: "S-1".to_string(),
            })
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            DomainError::from(SaleError::AmountOverflow {
                product_id: common::ProductId::new(),
            })
            .kind(),
            ErrorKind::Validation
        );
    }
}
