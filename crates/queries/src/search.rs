//! Cart search criteria.

use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId};
use domain::SaleStatus;
use sale_store::SaleQuery;

use crate::{QueryError, Result};

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Search for carts. Every filter is optional; pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCarts {
    pub customer_id: Option<CustomerId>,
    pub branch_id: Option<BranchId>,
    pub status: Option<SaleStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchCarts {
    fn default() -> Self {
        Self {
            customer_id: None,
            branch_id: None,
            status: None,
            from: None,
            to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchCarts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn status(mut self, status: SaleStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Checks the paging bounds and date range.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 || self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(QueryError::InvalidPage {
                page: self.page,
                page_size: self.page_size,
            });
        }
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(QueryError::InvalidDateRange);
        }
        Ok(())
    }

    /// Translates the search into a store query. Call [`validate`](Self::validate) first.
    pub fn to_store_query(&self) -> SaleQuery {
        let offset = (self.page.saturating_sub(1) as usize) * self.page_size as usize;
        let mut query = SaleQuery::new()
            .limit(self.page_size as usize)
            .offset(offset);

        if let Some(id) = self.customer_id {
            query = query.customer_id(id.as_uuid());
        }
        if let Some(id) = self.branch_id {
            query = query.branch_id(id.as_uuid());
        }
        if let Some(status) = self.status {
            query = query.status(status.as_str());
        }
        if let Some(from) = self.from {
            query = query.from_date(from);
        }
        if let Some(to) = self.to {
            query = query.to_date(to);
        }
        query
    }
}
