//! # Seed
//!
//! Fills a Postgres database with demo sellers and a small streetwear
//! catalogue, then prints a bearer token per seller for trying the API.
//! Refuses to run against a database that already holds items.

use anyhow::{bail, Context};
use auth_adapters::JwtTokenVerifier;
use configs::Settings;
use domains::{
    AiRecommendation, ItemRepository, NewItem, NewItemImage, Profile, ProfileRepository, QueryDescription,
    SortDirective,
};
use secrecy::ExposeSecret;
use storage_adapters::PgStore;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

struct DemoSeller {
    handle: &'static str,
    bio: &'static str,
    rating: f64,
}

struct DemoItem {
    title: &'static str,
    price: f64,
    brand: &'static str,
    size: &'static str,
    condition: &'static str,
    rec: AiRecommendation,
    seller: usize,
}

const SELLERS: &[DemoSeller] = &[
    DemoSeller { handle: "streetwear_king", bio: "Box logos and grails only.", rating: 4.9 },
    DemoSeller { handle: "sneakerhead99", bio: "Deadstock kicks, fast shipping.", rating: 4.7 },
    DemoSeller { handle: "hypebeast_collector", bio: "Clearing out the archive.", rating: 4.5 },
    DemoSeller { handle: "skate_life", bio: "Skate brands, worn with love.", rating: 4.2 },
];

const CATALOGUE: &[DemoItem] = &[
    DemoItem {
        title: "Supreme Box Logo Hoodie",
        price: 450.0,
        brand: "Supreme",
        size: "L",
        condition: "Like New",
        rec: AiRecommendation::FastSell,
        seller: 0,
    },
    DemoItem {
        title: "Travis Scott Jordan 1",
        price: 1200.0,
        brand: "Nike",
        size: "US 10",
        condition: "New",
        rec: AiRecommendation::Hold,
        seller: 1,
    },
    DemoItem {
        title: "Bape Shark Hoodie",
        price: 320.0,
        brand: "Bape",
        size: "M",
        condition: "Good",
        rec: AiRecommendation::Standard,
        seller: 2,
    },
    DemoItem {
        title: "Off-White Belt",
        price: 180.0,
        brand: "Off-White",
        size: "One Size",
        condition: "Like New",
        rec: AiRecommendation::FastSell,
        seller: 0,
    },
    DemoItem {
        title: "Palace Tri-Ferg Tee",
        price: 95.0,
        brand: "Palace",
        size: "S",
        condition: "Good",
        rec: AiRecommendation::Standard,
        seller: 3,
    },
    DemoItem {
        title: "Yeezy 350 Zebra",
        price: 320.0,
        brand: "Adidas",
        size: "US 9",
        condition: "New",
        rec: AiRecommendation::Hold,
        seller: 1,
    },
    DemoItem {
        title: "Nike Dunk Low Panda",
        price: 150.0,
        brand: "Nike",
        size: "US 11",
        condition: "Good",
        rec: AiRecommendation::FastSell,
        seller: 2,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("loading settings")?;
    let Some(url) = &settings.database.url else {
        bail!("database.url is not set (STREETMARKET__DATABASE__URL)");
    };

    let store = PgStore::connect(url.expose_secret(), settings.database.max_connections).await?;
    store.migrate().await?;

    if store.count(&QueryDescription::new(SortDirective::Newest)).await? > 0 {
        bail!("database already contains items; seed only runs against an empty catalogue");
    }

    let tokens = JwtTokenVerifier::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.issuer.clone(),
        settings.auth.ttl_seconds,
    );

    // 1. Sellers
    let mut seller_ids = Vec::with_capacity(SELLERS.len());
    for seller in SELLERS {
        let profile = store
            .create_profile(Profile {
                full_name: Some(seller.handle.to_string()),
                bio: Some(seller.bio.to_string()),
                rating: Some(seller.rating),
                ..Profile::blank(Uuid::new_v4())
            })
            .await?;
        seller_ids.push(profile.id);
    }

    // 2. Catalogue, one placeholder image per item
    for demo in CATALOGUE {
        let seller_id = seller_ids[demo.seller];
        let item = store
            .create_item(
                seller_id,
                NewItem {
                    title: demo.title.to_string(),
                    description: format!("{} in {} condition.", demo.title, demo.condition.to_lowercase()),
                    price: demo.price,
                    brand: Some(demo.brand.to_string()),
                    size: Some(demo.size.to_string()),
                    condition: Some(demo.condition.to_string()),
                    ai_recommendation: Some(demo.rec),
                },
            )
            .await?;
        store
            .add_images(seller_id, vec![NewItemImage {
                item_id: item.id,
                image_url: "/placeholder.svg?height=400&width=300".to_string(),
                is_primary: true,
            }])
            .await?;
        tracing::info!(item_id = %item.id, title = demo.title, "seeded item");
    }

    // 3. Tokens
    for (seller, id) in SELLERS.iter().zip(&seller_ids) {
        let token = tokens.issue(*id)?;
        println!("{:<20} {id}\n  Bearer {token}", seller.handle);
    }

    tracing::info!(sellers = SELLERS.len(), items = CATALOGUE.len(), "seed complete");
    Ok(())
}
