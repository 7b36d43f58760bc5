//! Sale status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of a sale in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Completed
///           │
///           └──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// Cart is open, items can be added, updated and removed.
    #[default]
    Pending,

    /// Sale was completed (terminal state).
    Completed,

    /// Sale was canceled (terminal state).
    Canceled,
}

impl SaleStatus {
    /// Returns true if items can be modified in this status.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, SaleStatus::Pending)
    }

    /// Returns true if the sale can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, SaleStatus::Pending)
    }

    /// Returns true if the sale can be canceled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, SaleStatus::Pending)
    }

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Completed | SaleStatus::Canceled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "Pending",
            SaleStatus::Completed => "Completed",
            SaleStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sale status: {0}")]
pub struct ParseSaleStatusError(pub String);

impl std::str::FromStr for SaleStatus {
    type Err = ParseSaleStatusError;

    /// Parses a status name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(SaleStatus::Pending),
            "completed" => Ok(SaleStatus::Completed),
            "canceled" | "cancelled" => Ok(SaleStatus::Canceled),
            _ => Err(ParseSaleStatusError(s.to_string())),
        }
    }
}
