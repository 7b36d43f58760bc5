use async_trait::async_trait;
use uuid::Uuid;

use crate::{Result, SalePage, SaleQuery, SaleRecord, Version};

/// Options for saving a sale record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Version the caller loaded. If None, no version check is performed
    /// and the last write wins.
    pub expected_version: Option<Version>,
}

impl SaveOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects the stored sale to be at exactly this version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Expects the sale not to be stored yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Storage for sale records.
///
/// Implementations must be thread-safe and must write a record and all of
/// its lines atomically.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Loads a sale record with its lines, or None if it does not exist.
    async fn get(&self, sale_id: Uuid) -> Result<Option<SaleRecord>>;

    /// Inserts or replaces a sale record and its lines.
    ///
    /// Fails with `ConcurrencyConflict` if `options.expected_version` is set
    /// and differs from the stored version. Returns the new version.
    async fn save(&self, record: SaleRecord, options: SaveOptions) -> Result<Version>;

    /// Returns the page of records matching the query, newest sale first.
    async fn search(&self, query: SaleQuery) -> Result<SalePage>;
}
