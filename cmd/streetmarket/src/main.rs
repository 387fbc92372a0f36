//! # Streetmarket Binary
//!
//! The entry point that assembles the application based on compile-time
//! features and runtime settings.

#[cfg(not(feature = "web-axum"))]
compile_error!("streetmarket serves HTTP; enable the `web-axum` feature");
#[cfg(not(feature = "auth-jwt"))]
compile_error!("streetmarket needs a token verifier; enable the `auth-jwt` feature");

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use auth_adapters::JwtTokenVerifier;
use configs::{LogFormat, LogSettings, Settings};
use domains::{ChannelNotifier, ItemRepository, MediaStorage, ProfileRepository};
use secrecy::ExposeSecret;
use services::{FeedService, FeedSettings, ListingService, ProfileService, RandomMultiplierSuggester, StatsService};
use storage_adapters::{InMemoryStore, NoopNotifier};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_logging(&settings.log);

    // 1. Persistence
    let (items, profiles) = build_store(&settings).await?;

    // 2. Media
    let media = build_media(&settings);

    // 3. External channel
    let notifier = build_notifier(&settings)?;

    // 4. Identity
    let tokens = Arc::new(JwtTokenVerifier::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.issuer.clone(),
        settings.auth.ttl_seconds,
    ));

    // 5. Services, wired through trait objects
    let feed_settings = FeedSettings {
        trending_limit: settings.feed.trending_limit,
        featured_limit: settings.feed.featured_limit,
        search_limit: settings.feed.search_limit,
        placeholder_url: settings.feed.placeholder_url.clone(),
    };
    let state = AppState {
        feed: Arc::new(FeedService::new(items.clone(), profiles.clone(), feed_settings)),
        listings: Arc::new(ListingService::new(
            items.clone(),
            media.clone(),
            notifier,
            Arc::new(RandomMultiplierSuggester),
        )),
        profiles: Arc::new(ProfileService::new(profiles, media)),
        stats: Arc::new(StatsService::new(items)),
        tokens,
    };

    let router = api_adapters::router(state);
    #[cfg(feature = "media-local")]
    let router = router.nest_service(
        &settings.media.public_url_prefix,
        tower_http::services::ServeDir::new(&settings.media.root),
    );

    // 6. Serve
    let addr: SocketAddr = settings
        .server
        .addr
        .parse()
        .with_context(|| format!("invalid server.addr '{}'", settings.server.addr))?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "streetmarket listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_logging(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
    tracing::info!(service = "streetmarket", "logging initialized");
}

type Stores = (Arc<dyn ItemRepository>, Arc<dyn ProfileRepository>);

async fn build_store(settings: &Settings) -> anyhow::Result<Stores> {
    #[cfg(feature = "db-postgres")]
    if let Some(url) = &settings.database.url {
        let store = storage_adapters::PgStore::connect(url.expose_secret(), settings.database.max_connections)
            .await
            .context("connecting to postgres")?;
        store.migrate().await.context("running migrations")?;
        tracing::info!("using postgres store");
        let store = Arc::new(store);
        return Ok((store.clone(), store));
    }

    #[cfg(not(feature = "db-postgres"))]
    let _ = settings;
    tracing::warn!("no database configured, listings live in memory only");
    let store = Arc::new(InMemoryStore::new());
    Ok((store.clone(), store))
}

fn build_media(settings: &Settings) -> Arc<dyn MediaStorage> {
    #[cfg(feature = "media-local")]
    {
        tracing::info!(root = %settings.media.root.display(), "storing media on local disk");
        Arc::new(storage_adapters::LocalMediaStorage::new(
            settings.media.root.clone(),
            settings.media.public_url_prefix.clone(),
        ))
    }
    #[cfg(not(feature = "media-local"))]
    {
        tracing::warn!("no media backend compiled in, uploads are kept in memory");
        Arc::new(storage_adapters::InMemoryMediaStorage::new(settings.media.public_url_prefix.clone()))
    }
}

fn build_notifier(settings: &Settings) -> anyhow::Result<Arc<dyn ChannelNotifier>> {
    #[cfg(feature = "notify-http")]
    if let Some(url) = &settings.notify.webhook_url {
        let timeout = std::time::Duration::from_millis(settings.notify.timeout_ms);
        let notifier = storage_adapters::WebhookNotifier::new(url.clone(), timeout)
            .context("building webhook client")?;
        return Ok(Arc::new(notifier));
    }

    #[cfg(not(feature = "notify-http"))]
    let _ = settings;
    Ok(Arc::new(NoopNotifier))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown requested");
    }
}
