use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    Result, SalePage, SaleQuery, SaleRecord, StoreError, Version,
    store::{SaleStore, SaveOptions},
};

/// In-memory sale store.
///
/// Used by tests and when no database is configured. Mirrors the
/// PostgreSQL store's versioning, sale number uniqueness and search
/// semantics.
#[derive(Clone, Default)]
pub struct InMemorySaleStore {
    sales: Arc<RwLock<HashMap<Uuid, SaleRecord>>>,
}

impl InMemorySaleStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sales.
    pub async fn sale_count(&self) -> usize {
        self.sales.read().await.len()
    }

    /// Removes every stored sale.
    pub async fn clear(&self) {
        self.sales.write().await.clear();
    }
}

#[async_trait]
impl SaleStore for InMemorySaleStore {
    async fn get(&self, sale_id: Uuid) -> Result<Option<SaleRecord>> {
        Ok(self.sales.read().await.get(&sale_id).cloned())
    }

    async fn save(&self, mut record: SaleRecord, options: SaveOptions) -> Result<Version> {
        let mut sales = self.sales.write().await;

        let current_version = sales
            .get(&record.id)
            .map(|r| r.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            metrics::counter!("sales_store_conflicts_total").increment(1);
            tracing::warn!(sale_id = %record.id, %expected, actual = %current_version, "version conflict");
            return Err(StoreError::ConcurrencyConflict {
                sale_id: record.id,
                expected,
                actual: current_version,
            });
        }

        if sales
            .values()
            .any(|other| other.id != record.id && other.sale_number == record.sale_number)
        {
            return Err(StoreError::DuplicateSaleNumber {
                sale_number: record.sale_number,
            });
        }

        let new_version = current_version.next();
        record.version = new_version;
        sales.insert(record.id, record);

        Ok(new_version)
    }

    async fn search(&self, query: SaleQuery) -> Result<SalePage> {
        let sales = self.sales.read().await;

        let mut matching: Vec<&SaleRecord> = sales.values().filter(|r| query.matches(r)).collect();
        matching.sort_by(|a, b| {
            b.sale_date
                .cmp(&a.sale_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total_count = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();

        Ok(SalePage {
            records,
            total_count,
        })
    }
}
