//! Snapshot of a sale returned to callers and carried by notifications.

use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId, ProductId, SaleId};
use serde::{Deserialize, Serialize};

use super::{Sale, SaleItem, SaleStatus};

/// A sale as seen from outside the aggregate. Amounts are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleResult {
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
    pub items: Vec<SaleItemResult>,
}

/// One line of a [`SaleResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemResult {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

impl From<&SaleItem> for SaleItemResult {
    fn from(item: &SaleItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            subtotal_cents: item.subtotal().cents(),
        }
    }
}

impl From<&Sale> for SaleResult {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_id: sale.customer_id(),
            branch_id: sale.branch_id(),
            status: sale.status(),
            total_amount_cents: sale.total_amount().cents(),
            created_at: sale.created_at(),
            updated_at: sale.updated_at(),
            canceled_at: sale.canceled_at(),
            cancellation_reason: sale.cancellation_reason().map(str::to_string),
            version: sale.version().as_i64(),
            items: sale.items().iter().map(SaleItemResult::from).collect(),
        }
    }
}
