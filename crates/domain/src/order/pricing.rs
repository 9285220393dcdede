//! Order pricing against current catalog prices.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use common::RecordId;
use order_store::{CatalogLookup, LineItem, Money, StoreError};
use serde::{Deserialize, Serialize};

use crate::deadline::{DEFAULT_TIMEOUT, bounded};
use crate::error::OrderError;

/// What to do with line items whose id is missing from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownItemPolicy {
    /// Fail pricing with [`OrderError::ItemNotFound`].
    #[default]
    Reject,

    /// Leave the line out of the total.
    Exclude,
}

impl FromStr for UnknownItemPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownItemPolicy::Reject),
            "exclude" => Ok(UnknownItemPolicy::Exclude),
            other => Err(format!("unknown item policy: {other}")),
        }
    }
}

/// Computes order totals from line items and catalog unit prices.
pub struct PricingEngine<C> {
    catalog: C,
    unknown_items: UnknownItemPolicy,
    timeout: Duration,
}

impl<C: CatalogLookup> PricingEngine<C> {
    /// Creates a pricing engine that rejects unknown items.
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            unknown_items: UnknownItemPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_unknown_items(mut self, policy: UnknownItemPolicy) -> Self {
        self.unknown_items = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Computes `sum(quantity * unit_price)` over `items`.
    ///
    /// Prices for all distinct ids are resolved in one catalog call. Duplicate
    /// ids are priced per occurrence.
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn compute_total(&self, items: &[LineItem]) -> Result<Money, OrderError> {
        if items.is_empty() {
            return Err(OrderError::OrderNotProvided);
        }
        if let Some(line) = items.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                item_id: line.item_id,
                quantity: line.quantity,
            });
        }

        let ids: HashSet<RecordId> = items.iter().map(|line| line.item_id).collect();
        let prices = bounded(
            "resolve_unit_prices",
            self.timeout,
            self.catalog.resolve_unit_prices(&ids),
        )
        .await?;

        let mut total = Money::zero();
        for line in items {
            let Some(price) = prices.get(&line.item_id) else {
                match self.unknown_items {
                    UnknownItemPolicy::Reject => {
                        return Err(OrderError::ItemNotFound(line.item_id));
                    }
                    UnknownItemPolicy::Exclude => {
                        tracing::debug!(item_id = %line.item_id, "excluding unknown item from total");
                        continue;
                    }
                }
            };
            if price.is_negative() {
                return Err(StoreError::Corrupt(format!(
                    "item {} has negative price {price}",
                    line.item_id
                ))
                .into());
            }

            total = price
                .checked_mul(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or(OrderError::TotalOverflow)?;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_store::InMemoryCatalog;

    async fn catalog_with(prices: &[i64]) -> (InMemoryCatalog, Vec<RecordId>) {
        let catalog = InMemoryCatalog::new();
        let mut ids = Vec::new();
        for (i, cents) in prices.iter().enumerate() {
            ids.push(
                catalog
                    .add_item(format!("item-{i}"), Money::from_cents(*cents))
                    .await,
            );
        }
        (catalog, ids)
    }

    #[tokio::test]
    async fn test_total_is_sum_of_quantity_times_price() {
        let (catalog, ids) = catalog_with(&[1000, 500]).await;
        let engine = PricingEngine::new(catalog);

        let total = engine
            .compute_total(&[LineItem::new(ids[0], 2), LineItem::new(ids[1], 3)])
            .await
            .unwrap();

        assert_eq!(total, Money::from_cents(3500));
        assert_eq!(total.as_f64(), 35.0);
    }

    #[tokio::test]
    async fn test_duplicate_ids_match_pre_aggregated_total() {
        let (catalog, ids) = catalog_with(&[250]).await;
        let engine = PricingEngine::new(catalog);

        let split = engine
            .compute_total(&[LineItem::new(ids[0], 1), LineItem::new(ids[0], 4)])
            .await
            .unwrap();
        let merged = engine
            .compute_total(&[LineItem::new(ids[0], 5)])
            .await
            .unwrap();

        assert_eq!(split, merged);
        assert_eq!(split, Money::from_cents(1250));
    }

    #[tokio::test]
    async fn test_empty_items_rejected() {
        let (catalog, _) = catalog_with(&[]).await;
        let engine = PricingEngine::new(catalog);

        let err = engine.compute_total(&[]).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderNotProvided));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let (catalog, ids) = catalog_with(&[100]).await;
        let engine = PricingEngine::new(catalog);

        let err = engine
            .compute_total(&[LineItem::new(ids[0], 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity { .. }));
    }

    #[tokio::test]
    async fn test_unknown_item_rejected_by_default() {
        let (catalog, ids) = catalog_with(&[100]).await;
        let engine = PricingEngine::new(catalog);
        let unknown = RecordId::new();

        let err = engine
            .compute_total(&[LineItem::new(ids[0], 1), LineItem::new(unknown, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ItemNotFound(id) if id == unknown));
    }

    #[tokio::test]
    async fn test_unknown_item_excluded_when_configured() {
        let (catalog, ids) = catalog_with(&[100]).await;
        let engine = PricingEngine::new(catalog).with_unknown_items(UnknownItemPolicy::Exclude);

        let total = engine
            .compute_total(&[LineItem::new(ids[0], 2), LineItem::new(RecordId::new(), 7)])
            .await
            .unwrap();
        assert_eq!(total, Money::from_cents(200));
    }

    #[tokio::test]
    async fn test_overflow_reported() {
        let (catalog, ids) = catalog_with(&[i64::MAX / 2]).await;
        let engine = PricingEngine::new(catalog);

        let err = engine
            .compute_total(&[LineItem::new(ids[0], 3)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::TotalOverflow));
    }

    #[tokio::test]
    async fn test_catalog_failure_passes_through() {
        let (catalog, ids) = catalog_with(&[100]).await;
        catalog.set_unavailable(true).await;
        let engine = PricingEngine::new(catalog);

        let err = engine
            .compute_total(&[LineItem::new(ids[0], 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_catalog_times_out() {
        let (catalog, ids) = catalog_with(&[100]).await;
        catalog.set_latency(Some(Duration::from_secs(30))).await;
        let engine = PricingEngine::new(catalog).with_timeout(Duration::from_secs(1));

        let err = engine
            .compute_total(&[LineItem::new(ids[0], 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Timeout { .. }));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "reject".parse::<UnknownItemPolicy>(),
            Ok(UnknownItemPolicy::Reject)
        );
        assert_eq!(
            "EXCLUDE".parse::<UnknownItemPolicy>(),
            Ok(UnknownItemPolicy::Exclude)
        );
        assert!("skip".parse::<UnknownItemPolicy>().is_err());
    }
}
