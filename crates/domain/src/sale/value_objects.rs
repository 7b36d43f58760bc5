//! Value objects for the sale domain.

use common::ProductId;
use serde::{Deserialize, Serialize};

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies by a quantity. Returns `None` on overflow.
    pub fn checked_mul(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Adds two amounts. Returns `None` on overflow.
    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A line of a sale: one product, how many, and at what price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    /// The product identifier. Unique within a sale.
    pub product_id: ProductId,

    /// Quantity, always greater than zero once accepted by a sale.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl SaleItem {
    /// Creates a new sale item.
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns quantity * unit_price, or `None` if it does not fit in an `i64`.
    pub fn checked_subtotal(&self) -> Option<Money> {
        self.unit_price.checked_mul(self.quantity)
    }

    /// Returns quantity * unit_price, saturating on overflow.
    ///
    /// Lines held by a sale always have a representable subtotal.
    pub fn subtotal(&self) -> Money {
        Money(self.unit_price.0.saturating_mul(i64::from(self.quantity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(2500).to_string(), "25.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let total = Money::from_cents(1000).checked_add(Money::from_cents(500));
        assert_eq!(total, Some(Money::from_cents(1500)));
        assert_eq!(
            Money::from_cents(250).checked_mul(4),
            Some(Money::from_cents(1000))
        );

        assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul(3), None);
        assert_eq!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            None
        );
    }

    #[test]
    fn test_item_subtotal() {
        let item = SaleItem::new(ProductId::new(), 3, Money::from_cents(200));
        assert_eq!(item.subtotal().cents(), 600);
        assert_eq!(item.checked_subtotal(), Some(Money::from_cents(600)));

        let huge = SaleItem::new(ProductId::new(), 3, Money::from_cents(i64::MAX / 2));
        assert_eq!(huge.checked_subtotal(), None);
    }

    #[test]
    fn test_money_serializes_as_cents() {
        assert_eq!(serde_json::to_string(&Money::from_cents(999)).unwrap(), "999");
    }
}
