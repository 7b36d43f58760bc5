use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::SaleRecord;

/// Filter and paging criteria for searching sale records.
///
/// Results are always ordered by sale date, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleQuery {
    /// Only sales of this customer.
    pub customer_id: Option<Uuid>,

    /// Only sales made at this branch.
    pub branch_id: Option<Uuid>,

    /// Only sales in this status (stored status name).
    pub status: Option<String>,

    /// Only sales dated at or after this instant.
    pub from_date: Option<DateTime<Utc>>,

    /// Only sales dated at or before this instant.
    pub to_date: Option<DateTime<Utc>>,

    /// Maximum number of records to return.
    pub limit: usize,

    /// Number of matching records to skip.
    pub offset: usize,
}

impl Default for SaleQuery {
    fn default() -> Self {
        Self {
            customer_id: None,
            branch_id: None,
            status: None,
            from_date: None,
            to_date: None,
            limit: 20,
            offset: 0,
        }
    }
}

impl SaleQuery {
    /// Creates a query matching every sale.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by customer.
    pub fn customer_id(mut self, id: Uuid) -> Self {
        self.customer_id = Some(id);
        self
    }

    /// Filters by branch.
    pub fn branch_id(mut self, id: Uuid) -> Self {
        self.branch_id = Some(id);
        self
    }

    /// Filters by status name.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Filters to sales dated at or after this instant.
    pub fn from_date(mut self, date: DateTime<Utc>) -> Self {
        self.from_date = Some(date);
        self
    }

    /// Filters to sales dated at or before this instant.
    pub fn to_date(mut self, date: DateTime<Utc>) -> Self {
        self.to_date = Some(date);
        self
    }

    /// Limits the number of records returned.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Skips this many matching records.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Returns true if the record satisfies every filter of this query.
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some(id) = self.customer_id
            && record.customer_id != id
        {
            return false;
        }
        if let Some(id) = self.branch_id
            && record.branch_id != id
        {
            return false;
        }
        if let Some(ref status) = self.status
            && &record.status != status
        {
            return false;
        }
        if let Some(from) = self.from_date
            && record.sale_date < from
        {
            return false;
        }
        if let Some(to) = self.to_date
            && record.sale_date > to
        {
            return false;
        }
        true
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SalePage {
    /// Records on this page.
    pub records: Vec<SaleRecord>,

    /// Number of records matching the filters, across all pages.
    pub total_count: u64,
}
