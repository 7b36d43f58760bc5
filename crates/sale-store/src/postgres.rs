use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result, SaleItemRecord, SalePage, SaleQuery, SaleRecord, StoreError, Version,
    store::{SaleStore, SaveOptions},
};

const SALE_COLUMNS: &str = "id, sale_number, sale_date, customer_id, branch_id, status, \
     total_amount_cents, created_at, updated_at, canceled_at, cancellation_reason, version";

const SALE_NUMBER_CONSTRAINT: &str = "unique_sale_number";

/// PostgreSQL-backed sale store.
#[derive(Clone)]
pub struct PostgresSaleStore {
    pool: PgPool,
}

impl PostgresSaleStore {
    /// Creates a new PostgreSQL sale store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    /// Opens a read-only transaction whose statements share one snapshot, so
    /// a sale and its lines are always read at the same version.
    async fn begin_read(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    fn row_to_record(row: &PgRow, items: Vec<SaleItemRecord>) -> Result<SaleRecord> {
        Ok(SaleRecord {
            id: row.try_get("id")?,
            sale_number: row.try_get("sale_number")?,
            sale_date: row.try_get("sale_date")?,
            customer_id: row.try_get("customer_id")?,
            branch_id: row.try_get("branch_id")?,
            status: row.try_get("status")?,
            total_amount_cents: row.try_get("total_amount_cents")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            canceled_at: row.try_get("canceled_at")?,
            cancellation_reason: row.try_get("cancellation_reason")?,
            version: Version::new(row.try_get("version")?),
            items,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<SaleItemRecord> {
        Ok(SaleItemRecord {
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price_cents: row.try_get("unit_price_cents")?,
            subtotal_cents: row.try_get("subtotal_cents")?,
        })
    }

    /// Loads the lines of several sales, grouped by sale and in position order.
    async fn load_items(
        conn: &mut PgConnection,
        sale_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<SaleItemRecord>>> {
        let rows = sqlx::query(
            r#"
            SELECT sale_id, product_id, quantity, unit_price_cents, subtotal_cents
            FROM sale_items
            WHERE sale_id = ANY($1)
            ORDER BY sale_id, position ASC
            "#,
        )
        .bind(sale_ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<SaleItemRecord>> = HashMap::new();
        for row in &rows {
            let sale_id: Uuid = row.try_get("sale_id")?;
            grouped
                .entry(sale_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }
        Ok(grouped)
    }
}

/// Maps a unique violation on the sale number to `DuplicateSaleNumber`.
fn sale_number_taken(err: sqlx::Error, sale_number: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.constraint() == Some(SALE_NUMBER_CONSTRAINT)
    {
        tracing::warn!(sale_number, "duplicate sale number");
        return StoreError::DuplicateSaleNumber {
            sale_number: sale_number.to_string(),
        };
    }
    StoreError::Database(err)
}

/// Appends the WHERE clause for a search query.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &SaleQuery) {
    builder.push(" WHERE 1=1");
    if let Some(id) = query.customer_id {
        builder.push(" AND customer_id = ").push_bind(id);
    }
    if let Some(id) = query.branch_id {
        builder.push(" AND branch_id = ").push_bind(id);
    }
    if let Some(ref status) = query.status {
        builder.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(from) = query.from_date {
        builder.push(" AND sale_date >= ").push_bind(from);
    }
    if let Some(to) = query.to_date {
        builder.push(" AND sale_date <= ").push_bind(to);
    }
}

#[async_trait]
impl SaleStore for PostgresSaleStore {
    async fn get(&self, sale_id: Uuid) -> Result<Option<SaleRecord>> {
        let mut tx = self.begin_read().await?;

        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1"))
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;

        let record = match row {
            Some(row) => {
                let items = Self::load_items(&mut *tx, vec![sale_id])
                    .await?
                    .remove(&sale_id)
                    .unwrap_or_default();
                Some(Self::row_to_record(&row, items)?)
            }
            None => None,
        };

        tx.commit().await?;
        Ok(record)
    }

    async fn save(&self, record: SaleRecord, options: SaveOptions) -> Result<Version> {
        let sale_id = record.id;
        let mut tx = self.pool.begin().await?;

        let current: Option<i64> =
            sqlx::query_scalar("SELECT version FROM sales WHERE id = $1 FOR UPDATE")
                .bind(sale_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current_version = current.map(Version::new).unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            metrics::counter!("sales_store_conflicts_total").increment(1);
            tracing::warn!(sale_id = %sale_id, %expected, actual = %current_version, "version conflict");
            return Err(StoreError::ConcurrencyConflict {
                sale_id,
                expected,
                actual: current_version,
            });
        }

        let new_version = current_version.next();

        if current.is_none() {
            sqlx::query(
                r#"
                INSERT INTO sales (id, sale_number, sale_date, customer_id, branch_id, status,
                    total_amount_cents, created_at, updated_at, canceled_at, cancellation_reason, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(sale_id)
            .bind(&record.sale_number)
            .bind(record.sale_date)
            .bind(record.customer_id)
            .bind(record.branch_id)
            .bind(&record.status)
            .bind(record.total_amount_cents)
            .bind(record.created_at)
            .bind(record.updated_at)
            .bind(record.canceled_at)
            .bind(&record.cancellation_reason)
            .bind(new_version.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // Another writer created the same sale between our read and insert
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some("sales_pkey")
                {
                    return StoreError::ConcurrencyConflict {
                        sale_id,
                        expected: options.expected_version.unwrap_or(Version::initial()),
                        actual: Version::first(),
                    };
                }
                sale_number_taken(e, &record.sale_number)
            })?;
        } else {
            sqlx::query(
                r#"
                UPDATE sales SET
                    sale_number = $2,
                    sale_date = $3,
                    customer_id = $4,
                    branch_id = $5,
                    status = $6,
                    total_amount_cents = $7,
                    created_at = $8,
                    updated_at = $9,
                    canceled_at = $10,
                    cancellation_reason = $11,
                    version = $12
                WHERE id = $1
                "#,
            )
            .bind(sale_id)
            .bind(&record.sale_number)
            .bind(record.sale_date)
            .bind(record.customer_id)
            .bind(record.branch_id)
            .bind(&record.status)
            .bind(record.total_amount_cents)
            .bind(record.created_at)
            .bind(record.updated_at)
            .bind(record.canceled_at)
            .bind(&record.cancellation_reason)
            .bind(new_version.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(|e| sale_number_taken(e, &record.sale_number))?;

            sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
                .bind(sale_id)
                .execute(&mut *tx)
                .await?;
        }

        for (position, item) in record.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, position, product_id, quantity, unit_price_cents, subtotal_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(sale_id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.subtotal_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(%sale_id, version = %new_version, "sale saved");
        Ok(new_version)
    }

    async fn search(&self, query: SaleQuery) -> Result<SalePage> {
        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM sales");
        push_filters(&mut count_builder, &query);
        let mut tx = self.begin_read().await?;

        let total_count = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;

        let mut page_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {SALE_COLUMNS} FROM sales"));
        push_filters(&mut page_builder, &query);
        page_builder
            .push(" ORDER BY sale_date DESC, id ASC LIMIT ")
            .push_bind(query.limit as i64)
            .push(" OFFSET ")
            .push_bind(query.offset as i64);

        let rows = page_builder.build().fetch_all(&mut *tx).await?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut items = Self::load_items(&mut *tx, ids).await?;

        let records = rows
            .iter()
            .map(|row| {
                let id: Uuid = row.try_get("id")?;
                Self::row_to_record(row, items.remove(&id).unwrap_or_default())
            })
            .collect::<Result<Vec<_>>>()?;
        tx.commit().await?;

        Ok(SalePage {
            records,
            total_count: total_count as u64,
        })
    }
}
