//! Persistence layer for sale records.
//!
//! The store knows nothing about the sale lifecycle. It keeps flat
//! [`SaleRecord`] rows, enforces optimistic concurrency through
//! [`Version`], and answers filtered, paginated searches for the read side.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemorySaleStore;
pub use postgres::PostgresSaleStore;
pub use query::{SalePage, SaleQuery};
pub use record::{SaleItemRecord, SaleRecord, Version};
pub use store::{SaleStore, SaveOptions};
