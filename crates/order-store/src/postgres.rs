use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use common::RecordId;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    LineItem, Money, Order, OrderPatch, OrderStatus, Result, StoreError,
    store::{CatalogLookup, OrderRepository},
};

/// Runs the database migrations shared by the order and catalog tables.
#[tracing::instrument(skip(pool), err)]
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// PostgreSQL-backed order repository.
///
/// Line items are kept as a JSONB document on the order row.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let items: serde_json::Value = row.try_get("items")?;
        let items: Vec<LineItem> = serde_json::from_value(items)?;
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(Order {
            id: RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: RecordId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            items,
            total: Money::from_cents(row.try_get("total_cents")?),
            status,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id), err)]
    async fn insert(&self, order: Order) -> Result<RecordId> {
        let items = serde_json::to_value(&order.items)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, items, total_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(items)
        .bind(order.total.cents())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(order.id)
    }

    #[tracing::instrument(skip(self, id), fields(order_id = %id), err)]
    async fn find_by_id(&self, id: RecordId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, items, total_cents, status, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    #[tracing::instrument(skip(self, id, patch), fields(order_id = %id), err)]
    async fn update_fields(
        &self,
        id: RecordId,
        patch: OrderPatch,
        expected_status: Option<OrderStatus>,
    ) -> Result<u64> {
        if patch.is_empty() {
            return Ok(0);
        }

        let items = patch.items.as_ref().map(serde_json::to_value).transpose()?;

        // The status precondition lives in the WHERE clause so the check and
        // the write are a single statement.
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                items = COALESCE($2, items),
                total_cents = COALESCE($3, total_cents),
                status = COALESCE($4, status)
            WHERE id = $1 AND ($5::TEXT IS NULL OR status = $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(items)
        .bind(patch.total.map(|t| t.cents()))
        .bind(patch.status.map(|s| s.as_str()))
        .bind(expected_status.map(|s| s.as_str()))
        .execute(&self.pool)
        .await?;

        let modified = result.rows_affected();
        if modified == 0 {
            tracing::debug!(?expected_status, "update matched no rows");
        }
        Ok(modified)
    }
}

/// PostgreSQL-backed item catalog.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Creates a new PostgreSQL catalog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds an item with a fresh identifier and returns it.
    #[tracing::instrument(skip(self), err)]
    pub async fn add_item(&self, name: &str, price: Money) -> Result<RecordId> {
        let id = RecordId::new();

        sqlx::query("INSERT INTO items (id, name, price_cents) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(name)
            .bind(price.cents())
            .execute(&self.pool)
            .await?;

        Ok(id)
    }
}

#[async_trait]
impl CatalogLookup for PostgresCatalog {
    #[tracing::instrument(skip(self, item_ids), fields(items = item_ids.len()), err)]
    async fn resolve_unit_prices(
        &self,
        item_ids: &HashSet<RecordId>,
    ) -> Result<HashMap<RecordId, Money>> {
        let ids: Vec<Uuid> = item_ids.iter().map(RecordId::as_uuid).collect();

        let rows = sqlx::query("SELECT id, price_cents FROM items WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<(RecordId, Money)> {
                Ok((
                    RecordId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    Money::from_cents(row.try_get("price_cents")?),
                ))
            })
            .collect()
    }
}
