//! Sale notification events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Sale, SaleItem, SaleItemResult, SaleResult};

/// Events published after a sale changes.
///
/// `SaleCreated` is published when a sale is completed, not when the cart
/// is first opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SaleEvent {
    /// An item was removed from the sale.
    ItemCancelled(ItemCancelledData),

    /// The sale was canceled.
    SaleCancelled(SaleCancelledData),

    /// The sale was completed.
    SaleCreated(SaleCreatedData),

    /// Items of a pending sale changed.
    SaleModified(SaleModifiedData),
}

/// Event kinds, used to route events to their handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleEventKind {
    ItemCancelled,
    SaleCancelled,
    SaleCreated,
    SaleModified,
}

impl SaleEventKind {
    /// All kinds, in declaration order.
    pub const ALL: [SaleEventKind; 4] = [
        SaleEventKind::ItemCancelled,
        SaleEventKind::SaleCancelled,
        SaleEventKind::SaleCreated,
        SaleEventKind::SaleModified,
    ];

    /// Returns the event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleEventKind::ItemCancelled => "ItemCancelled",
            SaleEventKind::SaleCancelled => "SaleCancelled",
            SaleEventKind::SaleCreated => "SaleCreated",
            SaleEventKind::SaleModified => "SaleModified",
        }
    }
}

impl std::fmt::Display for SaleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data for ItemCancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCancelledData {
    /// The sale after the item was removed.
    pub sale: SaleResult,

    /// The removed line.
    pub item: SaleItemResult,

    pub occurred_at: DateTime<Utc>,
}

/// Data for SaleCancelled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCancelledData {
    pub sale: SaleResult,

    /// Trimmed cancellation reason.
    pub reason: String,

    pub occurred_at: DateTime<Utc>,
}

/// Data for SaleCreated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCreatedData {
    pub sale: SaleResult,
    pub occurred_at: DateTime<Utc>,
}

/// Data for SaleModified event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleModifiedData {
    pub sale: SaleResult,
    pub occurred_at: DateTime<Utc>,
}

impl SaleEvent {
    pub(super) fn item_cancelled(sale: &Sale, item: SaleItem) -> Self {
        SaleEvent::ItemCancelled(ItemCancelledData {
            sale: SaleResult::from(sale),
            item: SaleItemResult::from(&item),
            occurred_at: Utc::now(),
        })
    }

    pub(super) fn sale_cancelled(sale: &Sale, reason: &str) -> Self {
        SaleEvent::SaleCancelled(SaleCancelledData {
            sale: SaleResult::from(sale),
            reason: reason.to_string(),
            occurred_at: Utc::now(),
        })
    }

    pub(super) fn sale_created(sale: &Sale) -> Self {
        SaleEvent::SaleCreated(SaleCreatedData {
            sale: SaleResult::from(sale),
            occurred_at: Utc::now(),
        })
    }

    pub(super) fn sale_modified(sale: &Sale) -> Self {
        SaleEvent::SaleModified(SaleModifiedData {
            sale: SaleResult::from(sale),
            occurred_at: Utc::now(),
        })
    }

    /// Returns the kind of this event.
    pub fn kind(&self) -> SaleEventKind {
        match self {
            SaleEvent::ItemCancelled(_) => SaleEventKind::ItemCancelled,
            SaleEvent::SaleCancelled(_) => SaleEventKind::SaleCancelled,
            SaleEvent::SaleCreated(_) => SaleEventKind::SaleCreated,
            SaleEvent::SaleModified(_) => SaleEventKind::SaleModified,
        }
    }

    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Returns the sale snapshot carried by the event.
    pub fn sale(&self) -> &SaleResult {
        match self {
            SaleEvent::ItemCancelled(data) => &data.sale,
            SaleEvent::SaleCancelled(data) => &data.sale,
            SaleEvent::SaleCreated(data) => &data.sale,
            SaleEvent::SaleModified(data) => &data.sale,
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleEvent::ItemCancelled(data) => data.occurred_at,
            SaleEvent::SaleCancelled(data) => data.occurred_at,
            SaleEvent::SaleCreated(data) => data.occurred_at,
            SaleEvent::SaleModified(data) => data.occurred_at,
        }
    }

    /// Overwrites the version recorded in the sale snapshot.
    ///
    /// Events are built before the sale is saved, so the snapshot still
    /// holds the version the sale was loaded at.
    pub(crate) fn set_sale_version(&mut self, version: i64) {
        match self {
            SaleEvent::ItemCancelled(data) => data.sale.version = version,
            SaleEvent::SaleCancelled(data) => data.sale.version = version,
            SaleEvent::SaleCreated(data) => data.sale.version = version,
            SaleEvent::SaleModified(data) => data.sale.version = version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let names: Vec<_> = SaleEventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            ["ItemCancelled", "SaleCancelled", "SaleCreated", "SaleModified"]
        );
    }
}
