//! # Upload Wizard
//!
//! The listing-creation flow as an explicit state machine:
//!
//! ```text
//! Photos -> Details -> Pricing -> Submitting -> Done | Failed
//! ```
//!
//! Validation happens on each forward transition, so nothing invalid ever
//! reaches the store. Submission creates the item row, uploads every photo
//! concurrently, records the image rows (first photo primary) and finally
//! pings the external channel on a best-effort basis.
//!
//! # Known gap
//! A failed photo upload aborts the submission but leaves the freshly
//! created item row in place, without images. There is no rollback.

use domains::{
    ChannelNotifier, DomainError, ItemRepository, MediaStorage, NewItem, NewItemImage, PriceSuggester, Result,
    Session,
};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::photo::Photo;
use crate::pricing::{recommendation_for, MAX_SELL_SPEED, NEUTRAL_SELL_SPEED};

/// Photos beyond this count are dropped at capture time.
pub const MAX_PHOTOS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum WizardStep {
    Photos,
    Details,
    Pricing,
    Submitting,
    Done { item_id: Uuid },
    Failed { reason: String },
}

impl WizardStep {
    fn name(&self) -> &'static str {
        match self {
            WizardStep::Photos => "photos",
            WizardStep::Details => "details",
            WizardStep::Pricing => "pricing",
            WizardStep::Submitting => "submitting",
            WizardStep::Done { .. } => "done",
            WizardStep::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub title: String,
    pub brand: String,
    pub size: String,
    pub condition: String,
    #[serde(default)]
    pub description: String,
}

impl ListingDetails {
    /// Title, brand, size and condition are all required.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("brand", &self.brand),
            ("size", &self.size),
            ("condition", &self.condition),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// The adapters a submission writes through.
#[derive(Clone, Copy)]
pub struct ListingPorts<'a> {
    pub items: &'a dyn ItemRepository,
    pub media: &'a dyn MediaStorage,
    pub notifier: &'a dyn ChannelNotifier,
}

#[derive(Debug, Clone)]
pub struct UploadWizard {
    step: WizardStep,
    photos: Vec<Photo>,
    details: ListingDetails,
    sell_speed: u8,
    suggested_price: Option<u32>,
}

impl Default for UploadWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Photos,
            photos: Vec::new(),
            details: ListingDetails::default(),
            sell_speed: NEUTRAL_SELL_SPEED,
            suggested_price: None,
        }
    }

    pub fn step(&self) -> &WizardStep {
        &self.step
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn details(&self) -> &ListingDetails {
        &self.details
    }

    pub fn sell_speed(&self) -> u8 {
        self.sell_speed
    }

    pub fn suggested_price(&self) -> Option<u32> {
        self.suggested_price
    }

    /// True once the photo limit is reached; further photos are dropped unread.
    pub fn is_full(&self) -> bool {
        self.photos.len() >= MAX_PHOTOS
    }

    /// Returns `Ok(false)` when the photo was dropped because four are already held.
    pub fn add_photo(&mut self, photo: Photo) -> Result<bool> {
        self.require(WizardStep::Photos, "adding photos")?;
        if self.is_full() {
            tracing::debug!(max = MAX_PHOTOS, "dropping photo beyond limit");
            return Ok(false);
        }
        self.photos.push(photo);
        Ok(true)
    }

    pub fn remove_photo(&mut self, index: usize) -> Result<()> {
        self.require(WizardStep::Photos, "removing photos")?;
        if index >= self.photos.len() {
            return Err(DomainError::Validation(format!("no photo at position {index}")));
        }
        self.photos.remove(index);
        Ok(())
    }

    pub fn continue_to_details(&mut self) -> Result<()> {
        self.require(WizardStep::Photos, "continuing to details")?;
        if self.photos.is_empty() {
            return Err(DomainError::Validation("add at least one photo".to_string()));
        }
        self.step = WizardStep::Details;
        Ok(())
    }

    pub fn set_details(&mut self, details: ListingDetails) -> Result<()> {
        self.require(WizardStep::Details, "editing details")?;
        self.details = details;
        Ok(())
    }

    pub fn continue_to_pricing(&mut self) -> Result<()> {
        self.require(WizardStep::Details, "continuing to pricing")?;
        let missing = self.details.missing_fields();
        if !missing.is_empty() {
            return Err(DomainError::Validation(format!("missing required fields: {}", missing.join(", "))));
        }
        self.step = WizardStep::Pricing;
        Ok(())
    }

    /// Steps back one screen. Only the editing steps can go back.
    pub fn back(&mut self) -> Result<()> {
        self.step = match self.step {
            WizardStep::Details => WizardStep::Photos,
            WizardStep::Pricing => WizardStep::Details,
            ref other => {
                return Err(DomainError::Validation(format!("cannot go back from the {} step", other.name())));
            }
        };
        Ok(())
    }

    pub fn set_sell_speed(&mut self, sell_speed: u8) -> Result<()> {
        self.require(WizardStep::Pricing, "adjusting sell speed")?;
        self.sell_speed = sell_speed.min(MAX_SELL_SPEED);
        Ok(())
    }

    pub fn generate_price(&mut self, suggester: &dyn PriceSuggester) -> Result<u32> {
        self.require(WizardStep::Pricing, "generating a price")?;
        let price = suggester.suggest(self.sell_speed);
        self.suggested_price = Some(price);
        Ok(price)
    }

    /// Records a price the client obtained from an earlier suggestion.
    pub fn accept_price(&mut self, price: u32) -> Result<()> {
        self.require(WizardStep::Pricing, "setting a price")?;
        self.suggested_price = Some(price);
        Ok(())
    }

    /// Publishes the listing. On success the wizard ends in `Done` and the new
    /// item id is returned; any store or upload failure ends it in `Failed`.
    pub async fn submit(&mut self, ports: ListingPorts<'_>, session: &Session) -> Result<Uuid> {
        self.require(WizardStep::Pricing, "publishing")?;
        let price = self
            .suggested_price
            .ok_or_else(|| DomainError::Validation("generate a price before publishing".to_string()))?;
        if self.photos.is_empty() {
            return Err(DomainError::Validation("add at least one photo".to_string()));
        }

        self.step = WizardStep::Submitting;
        match self.write_listing(ports, session, price).await {
            Ok(item_id) => {
                self.step = WizardStep::Done { item_id };
                Ok(item_id)
            }
            Err(err) => {
                self.step = WizardStep::Failed { reason: err.to_string() };
                Err(err)
            }
        }
    }

    async fn write_listing(&self, ports: ListingPorts<'_>, session: &Session, price: u32) -> Result<Uuid> {
        let new_item = NewItem {
            title: self.details.title.trim().to_string(),
            description: self.details.description.trim().to_string(),
            price: f64::from(price),
            brand: Some(self.details.brand.trim().to_string()),
            size: Some(self.details.size.trim().to_string()),
            condition: Some(self.details.condition.trim().to_string()),
            ai_recommendation: Some(recommendation_for(self.sell_speed)),
        };
        let item = ports.items.create_item(session.user_id, new_item).await?;
        tracing::info!(item_id = %item.id, seller_id = %session.user_id, "listing created");

        let media = ports.media;
        let uploads = self.photos.iter().enumerate().map(|(index, photo)| {
            let path = photo_path(session.user_id, item.id, index, photo.extension());
            async move {
                media
                    .upload(&path, photo.bytes(), photo.content_type())
                    .await
                    .map_err(|err| match err {
                        DomainError::Upload(_) => err,
                        other => DomainError::Upload(other.to_string()),
                    })
            }
        });
        let urls = try_join_all(uploads).await.inspect_err(|err| {
            tracing::error!(item_id = %item.id, error = %err, "photo upload failed, listing left without images");
        })?;

        let images = urls
            .into_iter()
            .enumerate()
            .map(|(index, image_url)| NewItemImage { item_id: item.id, image_url, is_primary: index == 0 })
            .collect();
        ports.items.add_images(session.user_id, images).await?;

        if let Err(err) = ports.notifier.notify_item_created(item.id).await {
            tracing::warn!(item_id = %item.id, error = %err, "channel notification failed");
        }

        Ok(item.id)
    }

    fn require(&self, expected: WizardStep, action: &str) -> Result<()> {
        if std::mem::discriminant(&self.step) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "{action} is not possible in the {} step",
                self.step.name()
            )))
        }
    }
}

/// Blob path for a listing photo, keyed by seller and item.
pub fn photo_path(seller_id: Uuid, item_id: Uuid, index: usize, extension: &str) -> String {
    format!("items/{seller_id}/{item_id}/{index}.{extension}")
}
