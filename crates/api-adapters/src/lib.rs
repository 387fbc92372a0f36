//! # api-adapters
//!
//! The HTTP surface of the marketplace, built on axum (`web-axum`).

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use state::AppState;

/// Upper bound for listing and avatar uploads (four photos plus form fields).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Builds the full application router with the standard middleware stack.
///
/// Mounted under `/api`, except for the health check. The binary adds
/// static media serving on top.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> axum::Router {
    use axum::extract::DefaultBodyLimit;
    use axum::routing::{get, post, put};

    let api = axum::Router::new()
        .route("/items", get(handlers::feed))
        .route("/items/{id}", get(handlers::item_detail).delete(handlers::delete_item))
        .route("/items/{id}/status", post(handlers::change_status))
        .route("/featured", get(handlers::featured))
        .route("/trending-items", get(handlers::trending))
        .route("/search", get(handlers::search))
        .route("/user-stats", get(handlers::user_stats))
        .route("/me/items", get(handlers::my_items))
        .route("/profile", get(handlers::get_profile).patch(handlers::update_profile))
        .route(
            "/profile/avatar",
            put(handlers::upload_avatar).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/price-suggestion", post(handlers::price_suggestion))
        .route(
            "/listings",
            post(handlers::create_listing).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        );

    let app = axum::Router::new()
        .route("/healthz", get(handlers::health))
        .nest("/api", api)
        .with_state(state);

    middleware::apply_standard_layers(app)
}
