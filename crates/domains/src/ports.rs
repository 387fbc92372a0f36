//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.
//! Every method returns a [`DomainError`](crate::errors::DomainError); adapters
//! convert their own failures at this boundary.

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Item, ItemImage, ItemRow, ItemStatus, NewItem, NewItemImage, Profile, ProfileUpdate};
use crate::query::QueryDescription;
use crate::session::Session;

/// Data persistence contract for items and their images.
///
/// Mutations take the acting seller's id and must only touch rows whose
/// `seller_id` matches it.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Runs a built query; rows come back in the query's sort order, each
    /// joined with the seller's display name and its images in stored order.
    async fn fetch(&self, query: &QueryDescription) -> Result<Vec<ItemRow>>;
    /// Counts items matching the predicates. Sort and limit are ignored.
    async fn count(&self, query: &QueryDescription) -> Result<u64>;
    async fn find(&self, id: Uuid) -> Result<Option<ItemRow>>;

    async fn create_item(&self, seller_id: Uuid, item: NewItem) -> Result<Item>;
    /// Inserts image rows in the given order. Fails with `Forbidden` when an
    /// image targets an item that does not belong to `seller_id`.
    async fn add_images(&self, seller_id: Uuid, images: Vec<NewItemImage>) -> Result<Vec<ItemImage>>;
    /// Returns `None` when no item with this id belongs to `seller_id`.
    async fn update_status(&self, id: Uuid, seller_id: Uuid, status: ItemStatus) -> Result<Option<Item>>;
    /// Deletes the item and its images. Returns false when nothing matched.
    async fn delete_item(&self, id: Uuid, seller_id: Uuid) -> Result<bool>;
}

/// Persistence contract for seller profiles.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    /// Inserts the profile unless one with the same id already exists.
    async fn create_profile(&self, profile: Profile) -> Result<Profile>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Profile>>;
}

/// Blob storage for listing photos and avatars.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Writes `data` at `path`, replacing anything already there, and
    /// returns the public URL of the stored object.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> Result<String>;
}

/// Identity contract: turns a bearer token into a session.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Session>;
}

/// Fire-and-forget announcement of newly created listings.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChannelNotifier: Send + Sync {
    async fn notify_item_created(&self, item_id: Uuid) -> Result<()>;
}

/// Produces the suggested price shown in the pricing step of the upload wizard.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PriceSuggester: Send + Sync {
    /// `sell_speed` is the slider position in `0..=100`.
    fn suggest(&self, sell_speed: u8) -> u32;
}
