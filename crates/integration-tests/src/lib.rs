//! Shared fixtures for the integration tests: catalogue builders, an
//! in-memory application and small HTTP helpers.

use std::sync::Arc;

use chrono::{Duration, Utc};
use domains::{AiRecommendation, Item, ItemImage, ItemStatus, Profile};
use services::{FeedService, FeedSettings, FixedBaseSuggester, ListingService, ProfileService, StatsService};
use storage_adapters::{InMemoryMediaStorage, InMemoryStore, NoopNotifier};
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"integration-test-secret";
pub const JWT_ISSUER: &str = "streetmarket-tests";
pub const MEDIA_PREFIX: &str = "/media";
/// Base price used by the deterministic suggester; speed 50 returns it as is.
pub const FIXED_BASE_PRICE: u32 = 200;

/// Smallest byte string the image sniffer recognises as PNG.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// An active listing created `minutes_ago` minutes before now.
pub fn item(title: &str, brand: &str, price: f64, seller_id: Uuid, minutes_ago: i64) -> Item {
    Item {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        price,
        brand: Some(brand.to_string()),
        size: Some("M".to_string()),
        condition: Some("Good".to_string()),
        status: ItemStatus::Active,
        ai_recommendation: None,
        seller_id,
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

pub fn with_status(mut item: Item, status: ItemStatus) -> Item {
    item.status = status;
    item
}

pub fn with_rec(mut item: Item, rec: AiRecommendation) -> Item {
    item.ai_recommendation = Some(rec);
    item
}

pub fn image(item_id: Uuid, url: &str, is_primary: bool) -> ItemImage {
    ItemImage { id: Uuid::new_v4(), item_id, image_url: url.to_string(), is_primary }
}

pub fn seller(name: &str) -> Profile {
    Profile { full_name: Some(name.to_string()), ..Profile::blank(Uuid::new_v4()) }
}

/// In-memory adapters plus the services wired on top of them.
pub struct TestWorld {
    pub store: Arc<InMemoryStore>,
    pub media: Arc<InMemoryMediaStorage>,
    pub feed: Arc<FeedService>,
    pub listings: Arc<ListingService>,
    pub profiles: Arc<ProfileService>,
    pub stats: Arc<StatsService>,
}

impl TestWorld {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let media = Arc::new(InMemoryMediaStorage::new(MEDIA_PREFIX));
        Self {
            feed: Arc::new(FeedService::new(store.clone(), store.clone(), FeedSettings::default())),
            listings: Arc::new(ListingService::new(
                store.clone(),
                media.clone(),
                Arc::new(NoopNotifier),
                Arc::new(FixedBaseSuggester(FIXED_BASE_PRICE)),
            )),
            profiles: Arc::new(ProfileService::new(store.clone(), media.clone())),
            stats: Arc::new(StatsService::new(store.clone())),
            store,
            media,
        }
    }

    pub async fn add(&self, item: Item) -> Uuid {
        let id = item.id;
        self.store.insert_item(item).await;
        id
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use std::sync::Arc;

    use api_adapters::AppState;
    use auth_adapters::JwtTokenVerifier;
    use axum::body::Body;
    use axum::http::{header, Method, Request, Response};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::{TestWorld, JWT_ISSUER, JWT_SECRET};

    pub const BOUNDARY: &str = "streetmarket-test-boundary";

    pub struct TestApp {
        pub world: TestWorld,
        pub tokens: Arc<JwtTokenVerifier>,
        pub router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let world = TestWorld::new();
            let tokens = Arc::new(JwtTokenVerifier::new(JWT_SECRET, JWT_ISSUER, 3600));
            let state = AppState {
                feed: world.feed.clone(),
                listings: world.listings.clone(),
                profiles: world.profiles.clone(),
                stats: world.stats.clone(),
                tokens: tokens.clone(),
            };
            Self { router: api_adapters::router(state), world, tokens }
        }

        pub fn bearer(&self, user_id: Uuid) -> String {
            format!("Bearer {}", self.tokens.issue(user_id).unwrap())
        }

        pub async fn send(&self, request: Request<Body>) -> Response<Body> {
            self.router.clone().oneshot(request).await.unwrap()
        }

        pub async fn get(&self, uri: &str) -> Response<Body> {
            self.send(Request::get(uri).body(Body::empty()).unwrap()).await
        }

        pub async fn get_as(&self, uri: &str, user_id: Uuid) -> Response<Body> {
            let request = Request::get(uri)
                .header(header::AUTHORIZATION, self.bearer(user_id))
                .body(Body::empty())
                .unwrap();
            self.send(request).await
        }

        pub async fn json_as(&self, method: Method, uri: &str, user_id: Uuid, body: Value) -> Response<Body> {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, self.bearer(user_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[derive(Clone, Copy)]
    pub enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    /// Encodes a `multipart/form-data` body delimited by [`BOUNDARY`].
    pub fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
                    );
                }
                Part::File(name, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}
