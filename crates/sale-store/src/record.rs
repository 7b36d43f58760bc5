use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version number of a stored sale, used for optimistic concurrency control.
///
/// A sale that was never saved is at version 0. Every successful save
/// increments the version by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The version of a sale that has not been persisted yet.
    pub fn initial() -> Self {
        Self(0)
    }

    /// The version written by the first save.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Persisted shape of a sale.
///
/// This is a flat row: identifiers are raw UUIDs, the status is its text
/// name and amounts are integer cents. Translating to and from the domain
/// aggregate is the domain crate's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub id: Uuid,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Uuid,
    pub branch_id: Uuid,
    pub status: String,
    pub total_amount_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    /// Version of the stored row. Ignored on save; the store assigns it.
    pub version: Version,
    /// Lines in insertion order.
    pub items: Vec<SaleItemRecord>,
}

/// Persisted shape of one sale line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleItemRecord {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_sequence() {
        assert_eq!(Version::default(), Version::initial());
        assert_eq!(Version::initial().next(), Version::first());
        assert_eq!(Version::first().next().as_i64(), 2);
    }

    #[test]
    fn version_display() {
        assert_eq!(Version::new(7).to_string(), "7");
    }
}
