//! # Listings
//!
//! Seller-side writes: price suggestions, publishing a finished upload
//! wizard, status changes and deletion. Every mutation is scoped to the
//! session's user.

use std::sync::Arc;

use domains::{
    AiRecommendation, ChannelNotifier, DomainError, Item, ItemRepository, ItemStatus, MediaStorage, PriceSuggester,
    Result, Session,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::{recommendation_for, MAX_SELL_SPEED};
use crate::wizard::{ListingPorts, UploadWizard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub price: u32,
    pub recommendation: AiRecommendation,
}

pub struct ListingService {
    items: Arc<dyn ItemRepository>,
    media: Arc<dyn MediaStorage>,
    notifier: Arc<dyn ChannelNotifier>,
    pricing: Arc<dyn PriceSuggester>,
}

impl ListingService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        media: Arc<dyn MediaStorage>,
        notifier: Arc<dyn ChannelNotifier>,
        pricing: Arc<dyn PriceSuggester>,
    ) -> Self {
        Self { items, media, notifier, pricing }
    }

    pub fn pricing(&self) -> &dyn PriceSuggester {
        self.pricing.as_ref()
    }

    pub fn suggest_price(&self, sell_speed: u8) -> PriceSuggestion {
        let sell_speed = sell_speed.min(MAX_SELL_SPEED);
        PriceSuggestion {
            price: self.pricing.suggest(sell_speed),
            recommendation: recommendation_for(sell_speed),
        }
    }

    /// Publishes a wizard that has reached the pricing step.
    pub async fn submit(&self, session: &Session, wizard: &mut UploadWizard) -> Result<Uuid> {
        let ports = ListingPorts {
            items: self.items.as_ref(),
            media: self.media.as_ref(),
            notifier: self.notifier.as_ref(),
        };
        wizard.submit(ports, session).await
    }

    pub async fn change_status(&self, session: &Session, id: Uuid, next: ItemStatus) -> Result<Item> {
        // 1. The item must exist
        let row = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", id))?;

        // 2. Only the seller may change it
        if !session.owns(row.item.seller_id) {
            tracing::warn!(item_id = %id, user_id = %session.user_id, "status change on foreign item");
            return Err(DomainError::Forbidden("item belongs to another seller".to_string()));
        }

        // 3. Only active items move, and never back
        let current = row.item.status;
        if !current.can_transition_to(next) {
            return Err(DomainError::InvalidTransition { from: current, to: next });
        }

        // 4. Persist. The row can vanish between the read and the write.
        let item = self
            .items
            .update_status(id, session.user_id, next)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", id))?;
        tracing::info!(item_id = %id, from = %current, to = %next, "item status changed");
        Ok(item)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<()> {
        let row = self
            .items
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Item", id))?;
        if !session.owns(row.item.seller_id) {
            return Err(DomainError::Forbidden("item belongs to another seller".to_string()));
        }
        if !self.items.delete_item(id, session.user_id).await? {
            return Err(DomainError::not_found("Item", id));
        }
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }
}
