//! Read side of the sales service.
//!
//! Queries read stored sale records directly and never load the write-side
//! aggregate:
//! - [`CartQueries::get_cart`] returns one cart as a [`CartView`]
//! - [`CartQueries::search_carts`] returns a [`Page`] of [`CartSummary`] rows

pub mod error;
pub mod search;
pub mod service;
pub mod views;

pub use error::{QueryError, Result};
pub use search::{MAX_PAGE_SIZE, SearchCarts};
pub use service::CartQueries;
pub use views::{CartItemView, CartSummary, CartView, Page};
