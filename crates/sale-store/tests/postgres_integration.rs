//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p sale-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use sale_store::{
    PostgresSaleStore, SaleItemRecord, SaleQuery, SaleRecord, SaleStore, SaveOptions, StoreError,
    Version,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_sales_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresSaleStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE sale_items, sales")
        .execute(&pool)
        .await
        .unwrap();

    PostgresSaleStore::new(pool)
}

fn test_record(customer_id: Uuid) -> SaleRecord {
    let now = Utc::now();
    let id = Uuid::new_v4();
    SaleRecord {
        id,
        sale_number: format!("S-{}", id.simple()),
        sale_date: now,
        customer_id,
        branch_id: Uuid::new_v4(),
        status: "Pending".to_string(),
        total_amount_cents: 2500,
        created_at: now,
        updated_at: None,
        canceled_at: None,
        cancellation_reason: None,
        version: Version::initial(),
        items: vec![
            SaleItemRecord {
                product_id: Uuid::new_v4(),
                quantity: 2,
                unit_price_cents: 1000,
                subtotal_cents: 2000,
            },
            SaleItemRecord {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price_cents: 500,
                subtotal_cents: 500,
            },
        ],
    }
}

#[tokio::test]
#[serial]
async fn save_and_load_preserves_items_in_order() {
    let store = get_test_store().await;
    let record = test_record(Uuid::new_v4());

    let version = store
        .save(record.clone(), SaveOptions::expect_new())
        .await
        .unwrap();
    assert_eq!(version, Version::first());

    let loaded = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded.sale_number, record.sale_number);
    assert_eq!(loaded.status, "Pending");
    assert_eq!(loaded.total_amount_cents, 2500);
    assert_eq!(loaded.version, Version::first());
    assert_eq!(loaded.items, record.items);
}

#[tokio::test]
#[serial]
async fn get_missing_sale_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn update_replaces_items_and_bumps_version() {
    let store = get_test_store().await;
    let mut record = test_record(Uuid::new_v4());

    store
        .save(record.clone(), SaveOptions::expect_new())
        .await
        .unwrap();

    record.items.remove(0);
    record.total_amount_cents = 500;
    record.status = "Completed".to_string();
    record.updated_at = Some(Utc::now());

    let version = store
        .save(record.clone(), SaveOptions::expect_version(Version::first()))
        .await
        .unwrap();
    assert_eq!(version, Version::new(2));

    let loaded = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded.items[0].unit_price_cents, 500);
    assert_eq!(loaded.status, "Completed");
    assert!(loaded.updated_at.is_some());
}

#[tokio::test]
#[serial]
async fn stale_version_is_rejected() {
    let store = get_test_store().await;
    let record = test_record(Uuid::new_v4());

    store
        .save(record.clone(), SaveOptions::expect_new())
        .await
        .unwrap();
    store
        .save(record.clone(), SaveOptions::expect_version(Version::first()))
        .await
        .unwrap();

    let result = store
        .save(record.clone(), SaveOptions::expect_version(Version::first()))
        .await;
    assert!(matches!(
        result,
        Err(StoreError::ConcurrencyConflict { .. })
    ));

    let loaded = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(loaded.version, Version::new(2));
}

#[tokio::test]
#[serial]
async fn duplicate_sale_number_is_rejected() {
    let store = get_test_store().await;
    let first = test_record(Uuid::new_v4());
    let mut second = test_record(Uuid::new_v4());
    second.sale_number = first.sale_number.clone();

    store
        .save(first.clone(), SaveOptions::expect_new())
        .await
        .unwrap();
    let result = store.save(second.clone(), SaveOptions::expect_new()).await;

    assert!(matches!(
        result,
        Err(StoreError::DuplicateSaleNumber { ref sale_number }) if *sale_number == first.sale_number
    ));
    assert!(store.get(second.id).await.unwrap().is_none());

    // Renaming onto a taken number on update is rejected too
    let mut third = test_record(Uuid::new_v4());
    store
        .save(third.clone(), SaveOptions::expect_new())
        .await
        .unwrap();
    third.sale_number = first.sale_number.clone();
    let result = store
        .save(third.clone(), SaveOptions::expect_version(Version::first()))
        .await;
    assert!(matches!(
        result,
        Err(StoreError::DuplicateSaleNumber { .. })
    ));
}

#[tokio::test]
#[serial]
async fn get_reads_sale_and_items_at_one_version() {
    let store = get_test_store().await;
    let mut record = test_record(Uuid::new_v4());
    // Header and lines agree only when read from the same save
    record.total_amount_cents = record.items[0].unit_price_cents;
    store
        .save(record.clone(), SaveOptions::expect_new())
        .await
        .unwrap();

    let reader = store.clone();
    let id = record.id;
    let reads = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..50 {
            seen.push(reader.get(id).await.unwrap().unwrap());
        }
        seen
    });

    for version in 1..=20 {
        record.items.rotate_left(1);
        record.total_amount_cents = record.items[0].unit_price_cents;
        store
            .save(record.clone(), SaveOptions::expect_version(Version::new(version)))
            .await
            .unwrap();
    }

    for loaded in reads.await.unwrap() {
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.total_amount_cents, loaded.items[0].unit_price_cents);
    }
}

#[tokio::test]
#[serial]
async fn search_filters_and_pages() {
    let store = get_test_store().await;
    let customer = Uuid::new_v4();
    let base = Utc::now();

    for hours in 0..4 {
        let mut record = test_record(customer);
        record.sale_date = base - Duration::hours(hours);
        if hours == 3 {
            record.status = "Canceled".to_string();
        }
        store.save(record, SaveOptions::expect_new()).await.unwrap();
    }
    store
        .save(test_record(Uuid::new_v4()), SaveOptions::expect_new())
        .await
        .unwrap();

    let page = store
        .search(
            SaleQuery::new()
                .customer_id(customer)
                .status("Pending")
                .limit(2),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 3);
    assert_eq!(page.records.len(), 2);
    assert!(page.records[0].sale_date > page.records[1].sale_date);
    assert!(page.records.iter().all(|r| r.items.len() == 2));

    let last_page = store
        .search(SaleQuery::new().customer_id(customer).limit(3).offset(3))
        .await
        .unwrap();
    assert_eq!(last_page.total_count, 4);
    assert_eq!(last_page.records.len(), 1);
    assert_eq!(last_page.records[0].status, "Canceled");
}
