//! # Discovery
//!
//! Read paths: the filtered feed, trending and featured surfaces, search
//! suggestions, a seller's own listings and the item detail view.
//!
//! List reads never fail towards the caller. A store error is logged and
//! the caller gets an empty result flagged as `degraded`.

use std::sync::Arc;

use domains::{
    DomainError, FilterState, Item, ItemImage, ItemRepository, ItemRow, ItemSummary, ProfileRepository,
    QueryDescription, Result, Session,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contact::{listing_inquiry, whatsapp_link};
use crate::image_selection::{select_cover, PLACEHOLDER_IMAGE_URL};
use crate::presenter::{present, present_owned, seller_display_name, DisplayItem, OwnedItem};
use crate::query_builder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSettings {
    pub trending_limit: usize,
    pub featured_limit: usize,
    pub search_limit: usize,
    pub placeholder_url: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            trending_limit: 5,
            featured_limit: 6,
            search_limit: 10,
            placeholder_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }
}

/// A list result plus whether it was served from a failed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub degraded: bool,
}

impl<T> Listing<T> {
    fn ok(items: Vec<T>) -> Self {
        Self { items, degraded: false }
    }

    fn degraded() -> Self {
        Self { items: Vec::new(), degraded: true }
    }
}

pub type FeedOutcome = Listing<DisplayItem>;

/// Public seller card on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerCard {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub rating: Option<f64>,
    pub contact_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub item: Item,
    pub images: Vec<ItemImage>,
    pub cover_image_url: String,
    pub seller: SellerCard,
}

pub struct FeedService {
    items: Arc<dyn ItemRepository>,
    profiles: Arc<dyn ProfileRepository>,
    settings: FeedSettings,
}

impl FeedService {
    pub fn new(items: Arc<dyn ItemRepository>, profiles: Arc<dyn ProfileRepository>, settings: FeedSettings) -> Self {
        Self { items, profiles, settings }
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub async fn feed(&self, state: &FilterState) -> FeedOutcome {
        let query = query_builder::build(state);
        self.fetch("feed", &query)
            .await
            .map(|rows| present(rows, &self.settings.placeholder_url))
            .map_or_else(Listing::degraded, Listing::ok)
    }

    pub async fn featured(&self) -> FeedOutcome {
        let query = query_builder::featured(self.settings.featured_limit);
        self.fetch("featured", &query)
            .await
            .map(|rows| present(rows, &self.settings.placeholder_url))
            .map_or_else(Listing::degraded, Listing::ok)
    }

    pub async fn trending(&self) -> Listing<ItemSummary> {
        let query = query_builder::trending(self.settings.trending_limit);
        self.fetch("trending", &query)
            .await
            .map(summaries)
            .map_or_else(Listing::degraded, Listing::ok)
    }

    /// Blank terms return an empty list without touching the store.
    pub async fn search(&self, term: &str) -> Listing<ItemSummary> {
        let Some(query) = query_builder::search(term, self.settings.search_limit) else {
            return Listing::ok(Vec::new());
        };
        self.fetch("search", &query)
            .await
            .map(summaries)
            .map_or_else(Listing::degraded, Listing::ok)
    }

    pub async fn seller_items(&self, session: &Session) -> Listing<OwnedItem> {
        let query = query_builder::seller_items(session.user_id);
        self.fetch("seller_items", &query)
            .await
            .map(|rows| present_owned(rows, &self.settings.placeholder_url))
            .map_or_else(Listing::degraded, Listing::ok)
    }

    /// Any status is viewable by id. Errors propagate here: a missing item
    /// must be distinguishable from an outage.
    pub async fn item_detail(&self, id: Uuid) -> Result<ItemDetail> {
        let row = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", id))?;

        let profile = match self.profiles.get_profile(row.item.seller_id).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(item_id = %id, error = %err, "seller profile lookup failed");
                None
            }
        };

        let contact_link = profile
            .as_ref()
            .and_then(|p| p.contact.as_deref())
            .and_then(|phone| whatsapp_link(phone, &listing_inquiry(&row.item.title)));
        let seller = SellerCard {
            id: row.item.seller_id,
            display_name: seller_display_name(
                profile
                    .as_ref()
                    .and_then(|p| p.full_name.as_deref())
                    .or(row.seller_name.as_deref()),
            ),
            avatar_url: profile.as_ref().and_then(|p| p.avatar_url.clone()),
            rating: profile.as_ref().and_then(|p| p.rating),
            contact_link,
        };

        Ok(ItemDetail {
            cover_image_url: select_cover(&row.images, &self.settings.placeholder_url).to_string(),
            item: row.item,
            images: row.images,
            seller,
        })
    }

    async fn fetch(&self, operation: &'static str, query: &QueryDescription) -> Option<Vec<ItemRow>> {
        match self.items.fetch(query).await {
            Ok(rows) => {
                tracing::debug!(operation, rows = rows.len(), "item query served");
                Some(rows)
            }
            Err(err) => {
                tracing::error!(operation, error = %err, code = err.code(), "item query failed, serving empty result");
                None
            }
        }
    }
}

fn summaries(rows: Vec<ItemRow>) -> Vec<ItemSummary> {
    rows.iter().map(|row| ItemSummary::from(&row.item)).collect()
}
