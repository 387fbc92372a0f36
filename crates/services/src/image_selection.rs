//! # Cover Image Selection
//!
//! Picks the image that represents an item in list views.

use domains::ItemImage;

/// Shown when an item has no images at all.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.svg?height=400&width=300";

/// First image flagged primary, else the first image, else `placeholder`.
///
/// Order-sensitive: images are taken exactly as the repository returned them.
/// Several images may claim `is_primary`; the earliest one wins.
pub fn select_cover<'a>(images: &'a [ItemImage], placeholder: &'a str) -> &'a str {
    images
        .iter()
        .find(|img| img.is_primary)
        .or_else(|| images.first())
        .map(|img| img.image_url.as_str())
        .unwrap_or(placeholder)
}
