//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and need a running Docker
//! daemon, so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use order_store::{
    CatalogLookup, LineItem, Money, Order, OrderPatch, OrderRepository, OrderStatus,
    PostgresCatalog, PostgresOrderRepository, RecordId,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

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
            order_store::run_migrations(&temp_pool).await.unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh pool with cleared tables
async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders, items")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

fn new_order(items: Vec<LineItem>, total: Money) -> Order {
    Order {
        id: RecordId::new(),
        customer_id: RecordId::new(),
        items,
        total,
        status: OrderStatus::Created,
        created_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires docker"]
#[serial]
async fn insert_and_find_order() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);
    let order = new_order(
        vec![
            LineItem::new(RecordId::new(), 2),
            LineItem::new(RecordId::new(), 3),
        ],
        Money::from_cents(3500),
    );

    let id = repo.insert(order.clone()).await.unwrap();
    let stored = repo.find_by_id(id).await.unwrap().unwrap();

    assert_eq!(stored.id, order.id);
    assert_eq!(stored.customer_id, order.customer_id);
    assert_eq!(stored.items, order.items);
    assert_eq!(stored.total, Money::from_cents(3500));
    assert_eq!(stored.status, OrderStatus::Created);
}

#[tokio::test]
#[ignore = "requires docker"]
#[serial]
async fn find_missing_order_returns_none() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);
    assert!(repo.find_by_id(RecordId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
#[serial]
async fn conditional_status_update() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);
    let id = repo
        .insert(new_order(
            vec![LineItem::new(RecordId::new(), 1)],
            Money::from_cents(100),
        ))
        .await
        .unwrap();

    let first = repo
        .update_fields(
            id,
            OrderPatch::status(OrderStatus::Paid),
            Some(OrderStatus::Created),
        )
        .await
        .unwrap();
    let second = repo
        .update_fields(
            id,
            OrderPatch::status(OrderStatus::Paid),
            Some(OrderStatus::Created),
        )
        .await
        .unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 0);
    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
}

#[tokio::test]
#[ignore = "requires docker"]
#[serial]
async fn partial_update_keeps_absent_fields() {
    let repo = PostgresOrderRepository::new(get_test_pool().await);
    let order = new_order(vec![LineItem::new(RecordId::new(), 1)], Money::from_cents(100));
    let id = repo.insert(order.clone()).await.unwrap();

    let new_items = vec![LineItem::new(RecordId::new(), 4)];
    let modified = repo
        .update_fields(
            id,
            OrderPatch {
                items: Some(new_items.clone()),
                total: Some(Money::from_cents(400)),
                status: None,
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(modified, 1);
    let stored = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.items, new_items);
    assert_eq!(stored.total, Money::from_cents(400));
    assert_eq!(stored.status, OrderStatus::Created);
    assert_eq!(stored.customer_id, order.customer_id);
}

#[tokio::test]
#[ignore = "requires docker"]
#[serial]
async fn catalog_resolves_known_prices_only() {
    let catalog = PostgresCatalog::new(get_test_pool().await);
    let widget = catalog
        .add_item("Widget", Money::from_cents(1000))
        .await
        .unwrap();
    let gadget = catalog
        .add_item("Gadget", Money::from_cents(500))
        .await
        .unwrap();
    let unknown = RecordId::new();

    let prices = catalog
        .resolve_unit_prices(&HashSet::from([widget, gadget, unknown]))
        .await
        .unwrap();

    assert_eq!(prices.len(), 2);
    assert_eq!(prices[&widget], Money::from_cents(1000));
    assert_eq!(prices[&gadget], Money::from_cents(500));
}
