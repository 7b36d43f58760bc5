//! Sale aggregate implementation.

use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId, ProductId, SaleId};
use sale_store::Version;
use serde::{Deserialize, Serialize};

use super::{Money, SaleError, SaleEvent, SaleItem, SaleStatus};

/// Sale aggregate root.
///
/// A sale starts as a Pending cart holding at least one item. While
/// Pending its items can change; it ends when it is completed or canceled.
/// Every mutating method checks the status first, then validates its input,
/// applies the change and returns the event describing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub(super) id: SaleId,
    pub(super) sale_number: String,
    pub(super) sale_date: DateTime<Utc>,
    pub(super) customer_id: CustomerId,
    pub(super) branch_id: BranchId,
    pub(super) status: SaleStatus,

    /// Lines in insertion order, at most one per product.
    pub(super) items: Vec<SaleItem>,

    /// Sum of item subtotals, recomputed after every item change.
    pub(super) total_amount: Money,

    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: Option<DateTime<Utc>>,
    pub(super) canceled_at: Option<DateTime<Utc>>,
    pub(super) cancellation_reason: Option<String>,

    /// Version the sale was loaded at, for optimistic concurrency.
    #[serde(default)]
    pub(super) version: Version,
}

// Query methods
impl Sale {
    /// Returns the sale ID.
    pub fn id(&self) -> SaleId {
        self.id
    }

    /// Returns the human-readable sale number.
    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    /// Returns when the sale was made.
    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the branch ID.
    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    /// Returns the current status.
    pub fn status(&self) -> SaleStatus {
        self.status
    }

    /// Returns all items in insertion order.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    /// Returns an item by product ID.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&SaleItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity over all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns the total amount.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns true if the sale has no items left.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn canceled_at(&self) -> Option<DateTime<Utc>> {
        self.canceled_at
    }

    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// Returns the version the sale was loaded or last saved at.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Records the version assigned by the store after a save.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Returns true if the sale is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Builds the default sale number: `S-<yyyymmdd>-<first 8 hex digits of the id>`.
    pub fn generate_number(id: SaleId, sale_date: DateTime<Utc>) -> String {
        let hex = id.as_uuid().simple().to_string().to_uppercase();
        format!("S-{}-{}", sale_date.format("%Y%m%d"), &hex[..8])
    }
}

// Lifecycle methods
impl Sale {
    /// Creates a new Pending sale.
    ///
    /// Items for the same product are merged into one line.
    pub fn create(
        id: SaleId,
        sale_number: impl Into<String>,
        customer_id: CustomerId,
        branch_id: BranchId,
        items: Vec<SaleItem>,
    ) -> Result<Self, SaleError> {
        if items.is_empty() {
            return Err(SaleError::NoItems);
        }

        let now = Utc::now();
        let mut sale = Self {
            id,
            sale_number: sale_number.into(),
            sale_date: now,
            customer_id,
            branch_id,
            status: SaleStatus::Pending,
            items: Vec::with_capacity(items.len()),
            total_amount: Money::zero(),
            created_at: now,
            updated_at: None,
            canceled_at: None,
            cancellation_reason: None,
            version: Version::initial(),
        };

        for item in items {
            validate_item(&item)?;
            merge_item(&mut sale.items, item)?;
        }
        sale.total_amount = total_of(&sale.items)?;

        Ok(sale)
    }

    /// Adds an item, merging it into an existing line for the same product.
    pub fn add_item(&mut self, item: SaleItem) -> Result<SaleEvent, SaleError> {
        self.ensure_can_modify("add item")?;
        validate_item(&item)?;

        let mut items = self.items.clone();
        merge_item(&mut items, item)?;
        self.replace_items(items)?;

        Ok(SaleEvent::sale_modified(self))
    }

    /// Sets the quantity of an existing line.
    pub fn update_item_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<SaleEvent, SaleError> {
        self.ensure_can_modify("update item quantity")?;

        if quantity == 0 {
            return Err(SaleError::InvalidQuantity {
                product_id: *product_id,
                quantity,
            });
        }

        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
            .ok_or(SaleError::ItemNotFound {
                product_id: *product_id,
            })?;
        item.quantity = quantity;
        self.replace_items(items)?;

        Ok(SaleEvent::sale_modified(self))
    }

    /// Removes a line. The sale stays Pending even if it becomes empty.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<SaleEvent, SaleError> {
        self.ensure_can_modify("remove item")?;

        let position = self
            .items
            .iter()
            .position(|item| &item.product_id == product_id)
            .ok_or(SaleError::ItemNotFound {
                product_id: *product_id,
            })?;
        let mut items = self.items.clone();
        let removed = items.remove(position);
        self.replace_items(items)?;

        Ok(SaleEvent::item_cancelled(self, removed))
    }

    /// Completes the sale.
    pub fn complete(&mut self) -> Result<SaleEvent, SaleError> {
        if !self.status.can_complete() {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action: "complete",
            });
        }

        self.status = SaleStatus::Completed;
        self.updated_at = Some(Utc::now());

        Ok(SaleEvent::sale_created(self))
    }

    /// Cancels the sale. The reason must not be blank.
    pub fn cancel(&mut self, reason: &str) -> Result<SaleEvent, SaleError> {
        if !self.status.can_cancel() {
            return Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action: "cancel",
            });
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SaleError::CancellationReasonRequired);
        }

        let now = Utc::now();
        self.status = SaleStatus::Canceled;
        self.canceled_at = Some(now);
        self.cancellation_reason = Some(reason.to_string());
        self.updated_at = Some(now);

        Ok(SaleEvent::sale_cancelled(self, reason))
    }
}

// Internal helpers
impl Sale {
    fn ensure_can_modify(&self, action: &'static str) -> Result<(), SaleError> {
        if self.status.can_modify_items() {
            Ok(())
        } else {
            Err(SaleError::InvalidStateTransition {
                current_status: self.status,
                action,
            })
        }
    }

    /// Swaps in a new set of lines once their total is known to fit.
    fn replace_items(&mut self, items: Vec<SaleItem>) -> Result<(), SaleError> {
        self.total_amount = total_of(&items)?;
        self.items = items;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}

fn merge_item(items: &mut Vec<SaleItem>, item: SaleItem) -> Result<(), SaleError> {
    match items
        .iter_mut()
        .find(|existing| existing.product_id == item.product_id)
    {
        Some(existing) => {
            existing.quantity = existing.quantity.checked_add(item.quantity).ok_or(
                SaleError::QuantityOverflow {
                    product_id: item.product_id,
                },
            )?;
        }
        None => items.push(item),
    }
    Ok(())
}

/// Sums line subtotals, failing on the first line that overflows.
pub(super) fn total_of(items: &[SaleItem]) -> Result<Money, SaleError> {
    items.iter().try_fold(Money::zero(), |total, item| {
        item.checked_subtotal()
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or(SaleError::AmountOverflow {
                product_id: item.product_id,
            })
    })
}

fn validate_item(item: &SaleItem) -> Result<(), SaleError> {
    if item.quantity == 0 {
        return Err(SaleError::InvalidQuantity {
            product_id: item.product_id,
            quantity: item.quantity,
        });
    }
    if !item.unit_price.is_positive() {
        return Err(SaleError::InvalidPrice {
            product_id: item.product_id,
            price: item.unit_price,
        });
    }
    if item.checked_subtotal().is_none() {
        return Err(SaleError::AmountOverflow {
            product_id: item.product_id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sale::SaleEventKind;

    fn item(product_id: ProductId, quantity: u32, cents: i64) -> SaleItem {
        SaleItem::new(product_id, quantity, Money::from_cents(cents))
    }

    fn create_sale() -> (Sale, ProductId, ProductId) {
        let a = ProductId::new();
        let b = ProductId::new();
        let id = SaleId::new();
        let sale = Sale::create(
            id,
            Sale::generate_number(id, Utc::now()),
            CustomerId::new(),
            BranchId::new(),
            vec![item(a, 2, 1000), item(b, 1, 500)],
        )
        .unwrap();
        (sale, a, b)
    }

    fn expected_total(sale: &Sale) -> i64 {
        sale.items()
            .iter()
            .map(|i| i.unit_price.cents() * i64::from(i.quantity))
            .sum()
    }

    #[test]
    fn test_create_sale() {
        let (sale, _, _) = create_sale();
        assert_eq!(sale.status(), SaleStatus::Pending);
        assert_eq!(sale.item_count(), 2);
        assert_eq!(sale.total_amount().cents(), 2500);
        assert_eq!(sale.version(), Version::initial());
        assert!(sale.updated_at().is_none());
        assert!(sale.sale_number().starts_with("S-"));
    }

    #[test]
    fn test_create_without_items_fails() {
        let result = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![],
        );
        assert!(matches!(result, Err(SaleError::NoItems)));
    }

    #[test]
    fn test_create_with_zero_quantity_fails() {
        let result = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![item(ProductId::new(), 1, 100), item(ProductId::new(), 0, 100)],
        );
        assert!(matches!(result, Err(SaleError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_create_with_zero_price_fails() {
        let result = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![item(ProductId::new(), 1, 0)],
        );
        assert!(matches!(result, Err(SaleError::InvalidPrice { .. })));
    }

    #[test]
    fn test_create_merges_duplicate_products() {
        let product = ProductId::new();
        let sale = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![item(product, 2, 300), item(product, 3, 300)],
        )
        .unwrap();

        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.get_item(&product).unwrap().quantity, 5);
        assert_eq!(sale.total_amount().cents(), 1500);
    }

    #[test]
    fn test_add_item_recomputes_total() {
        let (mut sale, _, _) = create_sale();
        let event = sale.add_item(item(ProductId::new(), 3, 200)).unwrap();

        assert_eq!(event.kind(), SaleEventKind::SaleModified);
        assert_eq!(sale.total_amount().cents(), 3100);
        assert_eq!(sale.total_amount().cents(), expected_total(&sale));
        assert!(sale.updated_at().is_some());
    }

    #[test]
    fn test_add_existing_product_merges_and_keeps_price() {
        let (mut sale, a, _) = create_sale();
        sale.add_item(item(a, 1, 9999)).unwrap();

        let line = sale.get_item(&a).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price.cents(), 1000);
        assert_eq!(sale.item_count(), 2);
        assert_eq!(sale.total_amount().cents(), 3500);
    }

    #[test]
    fn test_add_item_overflow_fails() {
        let (mut sale, a, _) = create_sale();
        let result = sale.add_item(item(a, u32::MAX, 1));
        assert!(matches!(result, Err(SaleError::QuantityOverflow { .. })));
        assert_eq!(sale.get_item(&a).unwrap().quantity, 2);
    }

    #[test]
    fn test_add_item_amount_overflow_fails() {
        let (mut sale, _, _) = create_sale();
        let result = sale.add_item(item(ProductId::new(), 3, i64::MAX / 2));

        assert!(matches!(result, Err(SaleError::AmountOverflow { .. })));
        assert_eq!(sale.item_count(), 2);
        assert_eq!(sale.total_amount().cents(), 2500);
    }

    #[test]
    fn test_add_item_total_overflow_leaves_sale_unchanged() {
        let (mut sale, a, _) = create_sale();
        let before = sale.clone();

        // Each line fits on its own, the sum does not.
        let result = sale.add_item(item(ProductId::new(), 1, i64::MAX - 100));
        assert!(matches!(result, Err(SaleError::AmountOverflow { .. })));
        assert_eq!(sale, before);

        let result = sale.add_item(item(a, 1, 1));
        assert!(result.is_ok());
    }

    #[test]
    fn test_create_with_overflowing_total_fails() {
        let result = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![
                item(ProductId::new(), 1, i64::MAX),
                item(ProductId::new(), 1, 1),
            ],
        );
        assert!(matches!(result, Err(SaleError::AmountOverflow { .. })));
    }

    #[test]
    fn test_update_item_quantity_amount_overflow_fails() {
        let product = ProductId::new();
        let mut sale = Sale::create(
            SaleId::new(),
            "S-1",
            CustomerId::new(),
            BranchId::new(),
            vec![item(product, 1, i64::MAX / 2)],
        )
        .unwrap();

        let result = sale.update_item_quantity(&product, 3);
        assert!(matches!(result, Err(SaleError::AmountOverflow { .. })));
        assert_eq!(sale.get_item(&product).unwrap().quantity, 1);
        assert_eq!(sale.total_amount().cents(), i64::MAX / 2);
    }

    #[test]
    fn test_update_item_quantity() {
        let (mut sale, a, _) = create_sale();
        let event = sale.update_item_quantity(&a, 5).unwrap();

        assert_eq!(event.kind(), SaleEventKind::SaleModified);
        assert_eq!(sale.get_item(&a).unwrap().quantity, 5);
        assert_eq!(sale.total_amount().cents(), 5500);
    }

    #[test]
    fn test_update_item_quantity_to_zero_fails() {
        let (mut sale, a, _) = create_sale();
        let result = sale.update_item_quantity(&a, 0);
        assert!(matches!(result, Err(SaleError::InvalidQuantity { .. })));
        assert_eq!(sale.total_amount().cents(), 2500);
    }

    #[test]
    fn test_update_missing_item_fails() {
        let (mut sale, _, _) = create_sale();
        let result = sale.update_item_quantity(&ProductId::new(), 1);
        assert!(matches!(result, Err(SaleError::ItemNotFound { .. })));
    }

    #[test]
    fn test_remove_item() {
        let (mut sale, a, b) = create_sale();
        let event = sale.remove_item(&a).unwrap();

        assert_eq!(event.kind(), SaleEventKind::ItemCancelled);
        assert_eq!(sale.item_count(), 1);
        assert_eq!(sale.items()[0].product_id, b);
        assert_eq!(sale.total_amount().cents(), 500);
    }

    #[test]
    fn test_remove_last_item_leaves_empty_pending_sale() {
        let (mut sale, a, b) = create_sale();
        sale.remove_item(&a).unwrap();
        sale.remove_item(&b).unwrap();

        assert!(sale.is_empty());
        assert_eq!(sale.status(), SaleStatus::Pending);
        assert_eq!(sale.total_amount(), Money::zero());
    }

    #[test]
    fn test_remove_missing_item_fails() {
        let (mut sale, _, _) = create_sale();
        let result = sale.remove_item(&ProductId::new());
        assert!(matches!(result, Err(SaleError::ItemNotFound { .. })));
    }

    #[test]
    fn test_complete() {
        let (mut sale, _, _) = create_sale();
        let event = sale.complete().unwrap();

        assert_eq!(event.kind(), SaleEventKind::SaleCreated);
        assert_eq!(sale.status(), SaleStatus::Completed);
        assert!(sale.is_terminal());
    }

    #[test]
    fn test_cancel_sets_reason_and_timestamp() {
        let (mut sale, _, _) = create_sale();
        let before = Utc::now();
        let event = sale.cancel("out of stock").unwrap();
        let after = Utc::now();

        assert_eq!(event.kind(), SaleEventKind::SaleCancelled);
        assert_eq!(sale.status(), SaleStatus::Canceled);
        assert_eq!(sale.cancellation_reason(), Some("out of stock"));
        let canceled_at = sale.canceled_at().unwrap();
        assert!(canceled_at >= before && canceled_at <= after);
    }

    #[test]
    fn test_cancel_with_blank_reason_fails() {
        let (mut sale, _, _) = create_sale();
        assert!(matches!(
            sale.cancel(""),
            Err(SaleError::CancellationReasonRequired)
        ));
        assert!(matches!(
            sale.cancel("   "),
            Err(SaleError::CancellationReasonRequired)
        ));
        assert_eq!(sale.status(), SaleStatus::Pending);
    }

    #[test]
    fn test_terminal_sales_reject_every_operation() {
        let (mut completed, a, _) = create_sale();
        completed.complete().unwrap();
        let (mut canceled, c, _) = create_sale();
        canceled.cancel("customer request").unwrap();

        for (sale, product) in [(&mut completed, a), (&mut canceled, c)] {
            let results = [
                sale.add_item(item(ProductId::new(), 1, 100)).map(|_| ()),
                sale.update_item_quantity(&product, 3).map(|_| ()),
                sale.remove_item(&product).map(|_| ()),
                sale.complete().map(|_| ()),
                sale.cancel("again").map(|_| ()),
            ];
            for result in results {
                assert!(matches!(
                    result,
                    Err(SaleError::InvalidStateTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn test_status_checked_before_input() {
        let (mut sale, _, _) = create_sale();
        sale.complete().unwrap();

        assert!(matches!(
            sale.cancel(""),
            Err(SaleError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            sale.update_item_quantity(&ProductId::new(), 0),
            Err(SaleError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_generate_number() {
        let id = SaleId::new();
        let date = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 3, 9, 12, 0, 0).unwrap();
        let number = Sale::generate_number(id, date);

        assert!(number.starts_with("S-20240309-"));
        assert_eq!(number.len(), "S-20240309-".len() + 8);
    }

    #[test]
    fn test_serialization() {
        let (sale, _, _) = create_sale();
        let json = serde_json::to_string(&sale).unwrap();
        let deserialized: Sale = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, sale);
    }
}
