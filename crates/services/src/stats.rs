//! # Seller Stats
//!
//! Dashboard aggregates over one seller's listings. Counts come from
//! `count` queries; only the rows a figure needs are fetched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{DomainError, ItemRepository, ItemRow, ItemStatus, Result, Session, SortDirective};
use futures_util::future::{try_join4, try_join_all};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::query_builder;

pub const RECENT_ITEMS: usize = 5;
pub const TOP_ITEMS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellerStats {
    pub sold_count: u64,
    pub active_count: u64,
    pub total_sales_value: f64,
    /// Mean asking price of active items, two decimals. Zero when none are listed.
    pub average_price: f64,
    pub recent_items: Vec<StatItem>,
    pub top_items: Vec<StatItem>,
    pub status_breakdown: BTreeMap<ItemStatus, u64>,
    #[serde(default)]
    pub degraded: bool,
}

impl SellerStats {
    /// Builds the dashboard from per-status counts plus three row sets:
    /// every sold item, every active item priced high to low, and the
    /// seller's newest items.
    pub fn assemble(
        counts: &[(ItemStatus, u64)],
        sold: &[ItemRow],
        active_by_price: &[ItemRow],
        recent: &[ItemRow],
    ) -> Self {
        let mut stats = SellerStats::default();
        for &(status, count) in counts {
            match status {
                ItemStatus::Sold => stats.sold_count = count,
                ItemStatus::Active => stats.active_count = count,
                ItemStatus::Pending => {}
            }
            if count > 0 {
                stats.status_breakdown.insert(status, count);
            }
        }

        stats.total_sales_value = sold.iter().map(|r| r.item.price).sum();
        if !active_by_price.is_empty() {
            let active_total: f64 = active_by_price.iter().map(|r| r.item.price).sum();
            stats.average_price = round_cents(active_total / active_by_price.len() as f64);
        }

        stats.recent_items = recent.iter().take(RECENT_ITEMS).map(stat_item).collect();
        stats.top_items = active_by_price.iter().take(TOP_ITEMS).map(stat_item).collect();
        stats
    }
}

fn stat_item(row: &ItemRow) -> StatItem {
    StatItem {
        id: row.item.id,
        title: row.item.title.clone(),
        price: row.item.price,
        status: row.item.status,
        created_at: row.item.created_at,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct StatsService {
    items: Arc<dyn ItemRepository>,
}

impl StatsService {
    pub fn new(items: Arc<dyn ItemRepository>) -> Self {
        Self { items }
    }

    pub async fn seller_stats(&self, session: &Session) -> SellerStats {
        match self.gather(session.user_id).await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::error!(seller_id = %session.user_id, error = %err, "stats query failed, serving empty stats");
                SellerStats { degraded: true, ..Default::default() }
            }
        }
    }

    async fn gather(&self, seller_id: Uuid) -> Result<SellerStats> {
        let items = self.items.as_ref();
        let status_query =
            |status: ItemStatus, sort: SortDirective| query_builder::seller_items_with_status(seller_id, status, sort);

        let counts = try_join_all(ItemStatus::ALL.map(|status| async move {
            let count = items.count(&status_query(status, SortDirective::Newest)).await?;
            Ok::<_, DomainError>((status, count))
        }));
        let sold_query = status_query(ItemStatus::Sold, SortDirective::Newest);
        let active_query = status_query(ItemStatus::Active, SortDirective::PriceDescending);
        let recent_query = query_builder::seller_items(seller_id).limit(RECENT_ITEMS);

        let (counts, sold, active, recent) = try_join4(
            counts,
            items.fetch(&sold_query),
            items.fetch(&active_query),
            items.fetch(&recent_query),
        )
        .await?;
        Ok(SellerStats::assemble(&counts, &sold, &active, &recent))
    }
}
