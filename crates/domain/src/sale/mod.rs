//! Sale (cart) aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod mapping;
mod policy;
mod result;
mod service;
mod status;
mod value_objects;

pub use aggregate::Sale;
pub use commands::*;
pub use events::{
    ItemCancelledData, SaleCancelledData, SaleCreatedData, SaleEvent, SaleEventKind,
    SaleModifiedData,
};
pub use policy::{AUTO_CANCEL_REASON, EmptyCartPolicy, ParseEmptyCartPolicyError};
pub use result::{SaleItemResult, SaleResult};
pub use service::CartService;
pub use status::{ParseSaleStatusError, SaleStatus};
pub use value_objects::{Money, SaleItem};

use common::ProductId;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the sale aggregate.
#[derive(Debug, Error)]
pub enum SaleError {
    /// A sale must be created with at least one item.
    #[error("A sale needs at least one item")]
    NoItems,

    /// Invalid quantity.
    #[error("Invalid quantity {quantity} for product {product_id} (must be greater than 0)")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: u32,
    },

    /// Invalid unit price.
    #[error("Invalid unit price {price} for product {product_id} (must be greater than 0)")]
    InvalidPrice { product_id: ProductId, price: Money },

    /// Merging a line would overflow its quantity.
    #[error("Quantity too large for product {product_id}")]
    QuantityOverflow { product_id: ProductId },

    /// A line subtotal or the sale total does not fit in the money range.
    #[error("Amount too large for product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// Cancellation needs a non-blank reason.
    #[error("A cancellation reason is required")]
    CancellationReasonRequired,

    /// Item not found in the sale.
    #[error("Item not found: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// The sale is not in a status that allows the action.
    #[error("Invalid state transition: cannot {action} a {current_status} sale")]
    InvalidStateTransition {
        current_status: SaleStatus,
        action: &'static str,
    },
}

impl SaleError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SaleError::NoItems
            | SaleError::InvalidQuantity { .. }
            | SaleError::InvalidPrice { .. }
            | SaleError::QuantityOverflow { .. }
            | SaleError::AmountOverflow { .. }
            | SaleError::CancellationReasonRequired => ErrorKind::Validation,
            SaleError::ItemNotFound { .. } => ErrorKind::NotFound,
            SaleError::InvalidStateTransition { .. } => ErrorKind::InvalidState,
        }
    }
}
