//! Conversion between the sale aggregate and its stored record.

use common::{BranchId, CustomerId, ProductId, SaleId};
use sale_store::{SaleItemRecord, SaleRecord};

use crate::error::DomainError;

use super::{Money, Sale, SaleItem, SaleStatus};

impl From<&Sale> for SaleRecord {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id.as_uuid(),
            sale_number: sale.sale_number.clone(),
            sale_date: sale.sale_date,
            customer_id: sale.customer_id.as_uuid(),
            branch_id: sale.branch_id.as_uuid(),
            status: sale.status.as_str().to_string(),
            total_amount_cents: sale.total_amount.cents(),
            created_at: sale.created_at,
            updated_at: sale.updated_at,
            canceled_at: sale.canceled_at,
            cancellation_reason: sale.cancellation_reason.clone(),
            version: sale.version,
            items: sale
                .items
                .iter()
                .map(|item| SaleItemRecord {
                    product_id: item.product_id.as_uuid(),
                    quantity: i64::from(item.quantity),
                    unit_price_cents: item.unit_price.cents(),
                    subtotal_cents: item.subtotal().cents(),
                })
                .collect(),
        }
    }
}

impl TryFrom<SaleRecord> for Sale {
    type Error = DomainError;

    /// Rebuilds a sale from storage. The total is recomputed from the lines.
    fn try_from(record: SaleRecord) -> Result<Self, Self::Error> {
        let sale_id = SaleId::from_uuid(record.id);
        let invalid = |reason: String| DomainError::InvalidRecord { sale_id, reason };

        let status: SaleStatus = record
            .status
            .parse()
            .map_err(|e: super::ParseSaleStatusError| invalid(e.to_string()))?;

        let items = record
            .items
            .into_iter()
            .map(|item| {
                let quantity = u32::try_from(item.quantity)
                    .ok()
                    .filter(|q| *q > 0)
                    .ok_or_else(|| invalid(format!("invalid quantity {}", item.quantity)))?;
                Ok(SaleItem::new(
                    ProductId::from_uuid(item.product_id),
                    quantity,
                    Money::from_cents(item.unit_price_cents),
                ))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let mut sale = Sale {
            id: sale_id,
            sale_number: record.sale_number,
            sale_date: record.sale_date,
            customer_id: CustomerId::from_uuid(record.customer_id),
            branch_id: BranchId::from_uuid(record.branch_id),
            status,
            items,
            total_amount: Money::zero(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            canceled_at: record.canceled_at,
            cancellation_reason: record.cancellation_reason,
            version: record.version,
        };
        sale.total_amount =
            super::aggregate::total_of(&sale.items).map_err(|e| invalid(e.to_string()))?;

        Ok(sale)
    }
}
