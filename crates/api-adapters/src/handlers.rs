//! # Handlers
//!
//! Coordinates the flow between HTTP requests and the marketplace services.
//! Read surfaces never fail: store outages show up as empty lists.

use axum::extract::{Multipart, Path, Query, RawQuery, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use domains::{FilterState, Item, ItemStatus, ItemSummary, Profile, ProfileUpdate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use services::filter_codec;
use services::{
    FeedOutcome, ItemDetail, Listing, ListingDetails, OwnedItem, Photo, PriceSuggestion, SellerStats, UploadWizard,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentUser;
use crate::state::AppState;

pub const TRENDING_CACHE: &str = "public, max-age=60";
pub const NO_STORE: &str = "no-store";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(flatten)]
    pub outcome: FeedOutcome,
    pub filters: FilterState,
    /// Canonical query string for the applied filters.
    pub query: String,
}

/// `GET /api/items?brands=..&minPrice=..&maxPrice=..&ai=..&sort=..`
pub async fn feed(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<FeedResponse> {
    let filters = filter_codec::decode_query_string(query.as_deref().unwrap_or_default());
    let outcome = state.feed.feed(&filters).await;
    Json(FeedResponse {
        query: filter_codec::encode_query_string(&filters),
        filters,
        outcome,
    })
}

pub async fn featured(State(state): State<AppState>) -> Json<FeedOutcome> {
    Json(state.feed.featured().await)
}

pub async fn trending(State(state): State<AppState>) -> impl IntoResponse {
    let listing = state.feed.trending().await;
    ([(CACHE_CONTROL, TRENDING_CACHE)], Json(listing.items))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> impl IntoResponse {
    let listing = state.feed.search(&params.q).await;
    let items: Vec<ItemSummary> = listing.items;
    ([(CACHE_CONTROL, NO_STORE)], Json(items))
}

pub async fn item_detail(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<ItemDetail>> {
    Ok(Json(state.feed.item_detail(id).await?))
}

pub async fn my_items(State(state): State<AppState>, CurrentUser(session): CurrentUser) -> Json<Listing<OwnedItem>> {
    Json(state.feed.seller_items(&session).await)
}

pub async fn user_stats(State(state): State<AppState>, CurrentUser(session): CurrentUser) -> Json<SellerStats> {
    Json(state.stats.seller_stats(&session).await)
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: ItemStatus,
}

pub async fn change_status(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.listings.change_status(&session, id, change.status).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.listings.delete(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_profile(State(state): State<AppState>, CurrentUser(session): CurrentUser) -> ApiResult<Json<Profile>> {
    Ok(Json(state.profiles.get(&session).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(state.profiles.update(&session, update).await?))
}

/// Raw image bytes in the body; the format is sniffed, not trusted from headers.
pub async fn upload_avatar(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    body: Bytes,
) -> ApiResult<Json<Profile>> {
    if body.is_empty() {
        return Err(ApiError::validation("avatar body is empty"));
    }
    Ok(Json(state.profiles.upload_avatar(&session, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub sell_speed: u8,
}

pub async fn price_suggestion(State(state): State<AppState>, Json(request): Json<PriceRequest>) -> Json<PriceSuggestion> {
    Json(state.listings.suggest_price(request.sell_speed))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedListing {
    pub id: Uuid,
    pub price: u32,
    /// Photos past the per-listing limit that were ignored.
    pub dropped_photos: usize,
}

/// `POST /api/listings` (multipart). Runs the upload wizard server-side:
/// photos, then details, then pricing, then submission.
pub async fn create_listing(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CreatedListing>)> {
    let mut wizard = UploadWizard::new();
    let mut details = ListingDetails::default();
    let mut sell_speed = None;
    let mut price = None;
    let mut dropped_photos = 0;

    // 1. Collect the form, adding photos as they stream in
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" | "photos" => {
                // Overflow is dropped unread, before any format check.
                if wizard.is_full() {
                    dropped_photos += 1;
                    continue;
                }
                let data = field.bytes().await.map_err(bad_form)?;
                wizard.add_photo(Photo::from_bytes(data)?)?;
            }
            "title" => details.title = field.text().await.map_err(bad_form)?,
            "brand" => details.brand = field.text().await.map_err(bad_form)?,
            "size" => details.size = field.text().await.map_err(bad_form)?,
            "condition" => details.condition = field.text().await.map_err(bad_form)?,
            "description" => details.description = field.text().await.map_err(bad_form)?,
            "sell_speed" => sell_speed = Some(parse_number::<u8>(&field.text().await.map_err(bad_form)?, "sell_speed")?),
            "price" => price = Some(parse_number::<u32>(&field.text().await.map_err(bad_form)?, "price")?),
            other => tracing::debug!(field = other, "ignoring unknown listing field"),
        }
    }
    if dropped_photos > 0 {
        tracing::info!(dropped_photos, "listing photos beyond the limit were dropped");
    }

    // 2. Walk the wizard forward; each step validates
    wizard.continue_to_details()?;
    wizard.set_details(details)?;
    wizard.continue_to_pricing()?;
    if let Some(speed) = sell_speed {
        wizard.set_sell_speed(speed)?;
    }
    let price = match price {
        Some(price) => {
            wizard.accept_price(price)?;
            price
        }
        None => wizard.generate_price(state.listings.pricing())?,
    };

    // 3. Publish
    let id = state.listings.submit(&session, &mut wizard).await?;
    Ok((StatusCode::CREATED, Json(CreatedListing { id, price, dropped_photos })))
}

fn bad_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::validation(format!("malformed form data: {err}"))
}

fn parse_number<T: std::str::FromStr>(value: &str, field: &str) -> ApiResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ApiError::validation(format!("{field} must be a non-negative integer")))
}
