//! # Query Descriptions
//!
//! Store-agnostic description of an item query: an ordered list of
//! predicates, one sort directive and an optional cap. Adapters translate
//! it into SQL or evaluate it in memory with [`Predicate::matches`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AiRecommendation, Item, ItemStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    StatusEq(ItemStatus),
    /// Exact, case-sensitive match against the stored brand.
    BrandIn(Vec<String>),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    RecommendationIn(Vec<AiRecommendation>),
    SellerEq(Uuid),
    /// Case-insensitive substring of the title or the brand.
    TitleOrBrandContains(String),
}

impl Predicate {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Predicate::StatusEq(status) => item.status == *status,
            Predicate::BrandIn(brands) => item
                .brand
                .as_ref()
                .is_some_and(|b| brands.iter().any(|wanted| wanted == b)),
            Predicate::PriceAtLeast(min) => item.price >= *min,
            Predicate::PriceAtMost(max) => item.price <= *max,
            Predicate::RecommendationIn(recs) => item
                .ai_recommendation
                .is_some_and(|r| recs.contains(&r)),
            Predicate::SellerEq(seller) => item.seller_id == *seller,
            Predicate::TitleOrBrandContains(term) => {
                let needle = term.to_lowercase();
                item.title.to_lowercase().contains(&needle)
                    || item
                        .brand
                        .as_ref()
                        .is_some_and(|b| b.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirective {
    /// `created_at` descending.
    #[default]
    Newest,
    PriceAscending,
    PriceDescending,
    /// Recommendation alphabetically (untagged last), then newest first.
    RecommendationThenNewest,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryDescription {
    pub predicates: Vec<Predicate>,
    pub sort: SortDirective,
    pub limit: Option<usize>,
}

impl QueryDescription {
    pub fn new(sort: SortDirective) -> Self {
        Self { predicates: Vec::new(), sort, limit: None }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True when every predicate accepts the item.
    pub fn matches(&self, item: &Item) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }
}
