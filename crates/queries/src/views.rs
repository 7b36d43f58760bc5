//! Read views built from stored sale records.

use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId, ProductId, SaleId};
use domain::SaleStatus;
use sale_store::{SaleItemRecord, SaleRecord};
use serde::Serialize;

use crate::{QueryError, Result};

/// Full view of one cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub branch_id: BranchId,
    pub status: SaleStatus,
    pub total_amount_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub version: i64,
    pub items: Vec<CartItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

/// One row of a cart search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub branch_id: BranchId,
    pub status: SaleStatus,
    pub total_amount_cents: i64,
    pub item_count: usize,
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1)));
        Self {
            items,
            page,
            page_size,
            total_count,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }
}

fn parse_status(record: &SaleRecord) -> Result<SaleStatus> {
    record
        .status
        .parse()
        .map_err(|e: domain::sale::ParseSaleStatusError| QueryError::InvalidRecord {
            sale_id: SaleId::from_uuid(record.id),
            reason: e.to_string(),
        })
}

impl From<&SaleItemRecord> for CartItemView {
    fn from(item: &SaleItemRecord) -> Self {
        Self {
            product_id: ProductId::from_uuid(item.product_id),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            subtotal_cents: item.subtotal_cents,
        }
    }
}

impl TryFrom<SaleRecord> for CartView {
    type Error = QueryError;

    fn try_from(record: SaleRecord) -> Result<Self> {
        let status = parse_status(&record)?;
        Ok(Self {
            id: SaleId::from_uuid(record.id),
            sale_number: record.sale_number,
            sale_date: record.sale_date,
            customer_id: CustomerId::from_uuid(record.customer_id),
            branch_id: BranchId::from_uuid(record.branch_id),
            status,
            total_amount_cents: record.total_amount_cents,
            created_at: record.created_at,
            updated_at: record.updated_at,
            canceled_at: record.canceled_at,
            cancellation_reason: record.cancellation_reason,
            version: record.version.as_i64(),
            items: record.items.iter().map(CartItemView::from).collect(),
        })
    }
}

impl TryFrom<&SaleRecord> for CartSummary {
    type Error = QueryError;

    fn try_from(record: &SaleRecord) -> Result<Self> {
        Ok(Self {
            id: SaleId::from_uuid(record.id),
            sale_number: record.sale_number.clone(),
            sale_date: record.sale_date,
            customer_id: CustomerId::from_uuid(record.customer_id),
            branch_id: BranchId::from_uuid(record.branch_id),
            status: parse_status(record)?,
            total_amount_cents: record.total_amount_cents,
            item_count: record.items.len(),
        })
    }
}
