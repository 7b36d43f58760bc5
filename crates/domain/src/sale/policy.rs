//! What to do with a pending cart whose last item was removed.

use thiserror::Error;

/// Reason recorded when a cart is canceled because it became empty.
pub const AUTO_CANCEL_REASON: &str = "All items removed";

/// Policy applied after removing the last item of a pending sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCartPolicy {
    /// Cancel the sale with [`AUTO_CANCEL_REASON`].
    #[default]
    AutoCancel,

    /// Leave the sale pending with no items.
    KeepPending,
}

impl EmptyCartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptyCartPolicy::AutoCancel => "auto-cancel",
            EmptyCartPolicy::KeepPending => "keep-pending",
        }
    }
}

impl std::fmt::Display for EmptyCartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown empty cart policy: {0} (expected auto-cancel or keep-pending)")]
pub struct ParseEmptyCartPolicyError(pub String);

impl std::str::FromStr for EmptyCartPolicy {
    type Err = ParseEmptyCartPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto-cancel" => Ok(EmptyCartPolicy::AutoCancel),
            "keep-pending" => Ok(EmptyCartPolicy::KeepPending),
            _ => Err(ParseEmptyCartPolicyError(s.to_string())),
        }
    }
}
