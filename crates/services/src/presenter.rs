//! # Result Presenter
//!
//! Lossy projection of repository rows into what the grid renders.
//! Input order is preserved; the query's sort is authoritative.

use chrono::{DateTime, Utc};
use domains::{AiRecommendation, ItemRow, ItemStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::image_selection::select_cover;

/// Seller label used when the profile has no usable name.
pub const ANONYMOUS_SELLER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub brand: Option<String>,
    pub cover_image_url: String,
    pub seller_display_name: String,
    pub ai_recommendation: Option<AiRecommendation>,
}

pub fn present(rows: Vec<ItemRow>, placeholder: &str) -> Vec<DisplayItem> {
    rows.into_iter().map(|row| present_row(row, placeholder)).collect()
}

pub fn present_row(row: ItemRow, placeholder: &str) -> DisplayItem {
    let cover_image_url = select_cover(&row.images, placeholder).to_string();
    DisplayItem {
        id: row.item.id,
        title: row.item.title,
        price: row.item.price,
        brand: row.item.brand,
        cover_image_url,
        seller_display_name: seller_display_name(row.seller_name.as_deref()),
        ai_recommendation: row.item.ai_recommendation,
    }
}

/// A seller's own listing as shown on the "my items" page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedItem {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub status: ItemStatus,
    pub brand: Option<String>,
    pub condition: Option<String>,
    pub cover_image_url: String,
    pub created_at: DateTime<Utc>,
}

pub fn present_owned(rows: Vec<ItemRow>, placeholder: &str) -> Vec<OwnedItem> {
    rows.into_iter()
        .map(|row| OwnedItem {
            cover_image_url: select_cover(&row.images, placeholder).to_string(),
            id: row.item.id,
            title: row.item.title,
            price: row.item.price,
            status: row.item.status,
            brand: row.item.brand,
            condition: row.item.condition,
            created_at: row.item.created_at,
        })
        .collect()
}

pub fn seller_display_name(full_name: Option<&str>) -> String {
    match full_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_SELLER.to_string(),
    }
}
