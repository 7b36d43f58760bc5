//! Cart queries over the sale store.

use common::SaleId;
use sale_store::SaleStore;

use crate::{CartSummary, CartView, Page, QueryError, Result, SearchCarts};

/// Answers cart queries straight from stored records.
#[derive(Clone)]
pub struct CartQueries<S: SaleStore> {
    store: S,
}

impl<S: SaleStore> CartQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns one cart with its lines.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, sale_id: SaleId) -> Result<CartView> {
        let record = self
            .store
            .get(sale_id.as_uuid())
            .await?
            .ok_or(QueryError::NotFound(sale_id))?;
        CartView::try_from(record)
    }

    /// Returns a page of carts matching the search, newest sale first.
    #[tracing::instrument(skip(self))]
    pub async fn search_carts(&self, search: SearchCarts) -> Result<Page<CartSummary>> {
        search.validate()?;

        let page = self.store.search(search.to_store_query()).await?;
        let items = page
            .records
            .iter()
            .map(CartSummary::try_from)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            returned = items.len(),
            total_count = page.total_count,
            "cart search complete"
        );

        Ok(Page::new(
            items,
            search.page,
            search.page_size,
            page.total_count,
        ))
    }
}
