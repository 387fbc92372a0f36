//! # Domain Models
//!
//! These structs represent the core entities of the marketplace.
//! Items and their images are owned by the seller's Profile; the seller
//! foreign key is always named `seller_id`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a listing. Only `active` items appear in public surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Sold,
    Pending,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Active, ItemStatus::Sold, ItemStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Sold => "sold",
            ItemStatus::Pending => "pending",
        }
    }

    /// There is no reactivation: an item leaves `active` once and stays out.
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Active, ItemStatus::Sold) | (ItemStatus::Active, ItemStatus::Pending)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ItemStatus::Active),
            "sold" => Ok(ItemStatus::Sold),
            "pending" => Ok(ItemStatus::Pending),
            other => Err(format!("unknown item status '{other}'")),
        }
    }
}

/// Selling-speed tag attached to a listing at creation time.
///
/// Variants are declared alphabetically; the featured ordering relies on `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AiRecommendation {
    #[serde(rename = "Fast Sell")]
    FastSell,
    Hold,
    Standard,
}

impl AiRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiRecommendation::FastSell => "Fast Sell",
            AiRecommendation::Standard => "Standard",
            AiRecommendation::Hold => "Hold",
        }
    }
}

impl fmt::Display for AiRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiRecommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fast Sell" => Ok(AiRecommendation::FastSell),
            "Standard" => Ok(AiRecommendation::Standard),
            "Hold" => Ok(AiRecommendation::Hold),
            other => Err(format!("unknown recommendation '{other}'")),
        }
    }
}

/// A single marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Never negative.
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub status: ItemStatus,
    pub ai_recommendation: Option<AiRecommendation>,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A photo attached to an item. Several rows may claim `is_primary`;
/// nothing in the store enforces uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImage {
    pub id: Uuid,
    pub item_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
}

/// One profile per authenticated user; `id` is the auth identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    /// Free-text phone/contact string.
    pub contact: Option<String>,
    pub rating: Option<f64>,
}

impl Profile {
    pub fn blank(id: Uuid) -> Self {
        Self { id, ..Default::default() }
    }
}

/// Fields a seller may edit on their own profile. `None` leaves the column untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.contact.is_none()
            && self.avatar_url.is_none()
            && self.bio.is_none()
    }

    pub fn apply_to(self, profile: &mut Profile) {
        if let Some(v) = self.full_name {
            profile.full_name = Some(v);
        }
        if let Some(v) = self.contact {
            profile.contact = Some(v);
        }
        if let Some(v) = self.avatar_url {
            profile.avatar_url = Some(v);
        }
        if let Some(v) = self.bio {
            profile.bio = Some(v);
        }
    }
}

/// Insert payload for a new listing. The seller comes from the session,
/// never from the client, and status always starts as `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub ai_recommendation: Option<AiRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemImage {
    pub item_id: Uuid,
    pub image_url: String,
    pub is_primary: bool,
}

/// An item joined with its seller's display name and full image set,
/// images in stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item: Item,
    pub seller_name: Option<String>,
    pub images: Vec<ItemImage>,
}

/// Minimal projection used by search suggestions and trending lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: Uuid,
    pub title: String,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self { id: item.id, title: item.title.clone() }
    }
}
