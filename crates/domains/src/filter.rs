//! # FilterState
//!
//! Decoded, in-memory form of the feed's active filters and sort order.
//! Built from the query string on every navigation and never persisted.

use serde::{Deserialize, Serialize};

use crate::models::AiRecommendation;

/// Lower bound shown by the price slider when no `minPrice` was supplied.
pub const DEFAULT_MIN_PRICE: u32 = 0;
/// Upper bound shown by the price slider when no `maxPrice` was supplied.
pub const DEFAULT_MAX_PRICE: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
        }
    }

    /// Anything unrecognised, including an absent value, means newest first.
    pub fn from_param(value: &str) -> Self {
        match value {
            "price-asc" => SortOrder::PriceAsc,
            "price-desc" => SortOrder::PriceDesc,
            _ => SortOrder::Newest,
        }
    }
}

/// Brands and recommendations are ordered sets: insertion order is kept so the
/// encoded query string is stable, duplicates are never stored.
///
/// Price bounds are `None` when the URL did not carry them. The query builder
/// only restricts on bounds that were actually supplied; the slider falls back
/// to [`DEFAULT_MIN_PRICE`]..[`DEFAULT_MAX_PRICE`] via [`FilterState::price_range`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub brands: Vec<String>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub ai: Vec<AiRecommendation>,
    pub sort: SortOrder,
}

impl FilterState {
    pub fn price_range(&self) -> (u32, u32) {
        (
            self.min_price.unwrap_or(DEFAULT_MIN_PRICE),
            self.max_price.unwrap_or(DEFAULT_MAX_PRICE),
        )
    }

    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    /// Checkbox semantics: add the brand if absent, remove it if present.
    pub fn toggle_brand(&mut self, brand: &str) {
        if let Some(pos) = self.brands.iter().position(|b| b == brand) {
            self.brands.remove(pos);
        } else if !brand.is_empty() {
            self.brands.push(brand.to_string());
        }
    }

    pub fn toggle_recommendation(&mut self, rec: AiRecommendation) {
        if let Some(pos) = self.ai.iter().position(|r| *r == rec) {
            self.ai.remove(pos);
        } else {
            self.ai.push(rec);
        }
    }

    pub fn set_price_range(&mut self, min: u32, max: u32) {
        let (min, max) = if min > max { (max, min) } else { (min, max) };
        self.min_price = Some(min);
        self.max_price = Some(max);
    }

    pub fn clear(&mut self) {
        *self = FilterState::default();
    }
}
