use std::sync::Arc;

use domains::TokenVerifier;
use services::{FeedService, ListingService, ProfileService, StatsService};

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedService>,
    pub listings: Arc<ListingService>,
    pub profiles: Arc<ProfileService>,
    pub stats: Arc<StatsService>,
    pub tokens: Arc<dyn TokenVerifier>,
}
