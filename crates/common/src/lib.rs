//! Identifier types shared across the sales service crates.

pub mod types;

pub use types::{BranchId, CustomerId, ProductId, SaleId};
