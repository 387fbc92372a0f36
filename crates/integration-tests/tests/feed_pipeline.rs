//! The URL -> filter state -> query -> store -> presenter pipeline against
//! the in-memory store.

use domains::{AiRecommendation, ItemStatus, Session};
use integration_tests::{image, item, seller, with_rec, with_status, TestWorld};
use services::filter_codec;
use services::image_selection::PLACEHOLDER_IMAGE_URL;
use services::presenter::ANONYMOUS_SELLER;
use uuid::Uuid;

#[tokio::test]
async fn brand_and_price_filters_narrow_the_feed() {
    let world = TestWorld::new();
    let seller_id = Uuid::new_v4();
    world.add(item("Dunk Low", "Nike", 150.0, seller_id, 4)).await;
    world.add(item("Box Logo Tee", "Supreme", 80.0, seller_id, 3)).await;
    world.add(item("Samba", "Adidas", 200.0, seller_id, 2)).await;
    world.add(item("Travis Scott Jordan 1", "Nike", 600.0, seller_id, 1)).await;

    let state = filter_codec::decode_query_string("brands=Nike,Supreme&minPrice=100&maxPrice=500&sort=price-asc");
    let outcome = world.feed.feed(&state).await;

    assert!(!outcome.degraded);
    let shown: Vec<_> = outcome.items.iter().map(|i| (i.brand.as_deref(), i.price)).collect();
    assert_eq!(shown, vec![(Some("Nike"), 150.0)]);
}

#[tokio::test]
async fn sort_orders_are_applied_by_the_store() {
    let world = TestWorld::new();
    let seller_id = Uuid::new_v4();
    world.add(item("Oldest", "Bape", 300.0, seller_id, 30)).await;
    world.add(item("Middle", "Bape", 100.0, seller_id, 20)).await;
    world.add(item("Newest", "Bape", 200.0, seller_id, 10)).await;

    let titles = |outcome: services::FeedOutcome| -> Vec<String> {
        outcome.items.into_iter().map(|i| i.title).collect()
    };

    let newest = world.feed.feed(&filter_codec::decode_query_string("")).await;
    assert_eq!(titles(newest), vec!["Newest", "Middle", "Oldest"]);

    let cheapest = world.feed.feed(&filter_codec::decode_query_string("sort=price-asc")).await;
    assert_eq!(titles(cheapest), vec!["Middle", "Newest", "Oldest"]);

    let priciest = world.feed.feed(&filter_codec::decode_query_string("sort=price-desc")).await;
    assert_eq!(titles(priciest), vec!["Oldest", "Newest", "Middle"]);
}

#[tokio::test]
async fn only_active_items_reach_public_surfaces() {
    let world = TestWorld::new();
    let seller_id = Uuid::new_v4();
    world.add(item("Visible Hoodie", "Palace", 120.0, seller_id, 3)).await;
    world.add(with_status(item("Sold Hoodie", "Palace", 130.0, seller_id, 2), ItemStatus::Sold)).await;
    world.add(with_status(item("Pending Hoodie", "Palace", 140.0, seller_id, 1), ItemStatus::Pending)).await;

    let feed = world.feed.feed(&Default::default()).await;
    assert_eq!(feed.items.len(), 1);
    assert_eq!(feed.items[0].title, "Visible Hoodie");

    let found = world.feed.search("hoodie").await;
    assert_eq!(found.items.len(), 1);

    let trending = world.feed.trending().await;
    assert_eq!(trending.items.len(), 1);

    // The owner still sees everything.
    let own = world.feed.seller_items(&Session::new(seller_id)).await;
    assert_eq!(own.items.len(), 3);
}

#[tokio::test]
async fn presenter_fills_cover_and_seller_name() {
    let world = TestWorld::new();
    let named = seller("streetwear_king");
    world.store.insert_profile(named.clone());

    let with_photos = world.add(item("Bogo Hoodie", "Supreme", 450.0, named.id, 2)).await;
    world.store.insert_image(image(with_photos, "/media/a.png", false)).await;
    world.store.insert_image(image(with_photos, "/media/b.png", true)).await;
    world.add(item("Mystery Tee", "Palace", 60.0, Uuid::new_v4(), 1)).await;

    let outcome = world.feed.feed(&Default::default()).await;
    let bogo = outcome.items.iter().find(|i| i.id == with_photos).unwrap();
    assert_eq!(bogo.cover_image_url, "/media/b.png");
    assert_eq!(bogo.seller_display_name, "streetwear_king");

    let mystery = outcome.items.iter().find(|i| i.title == "Mystery Tee").unwrap();
    assert_eq!(mystery.cover_image_url, PLACEHOLDER_IMAGE_URL);
    assert_eq!(mystery.seller_display_name, ANONYMOUS_SELLER);
}

#[tokio::test]
async fn featured_groups_by_recommendation_and_caps_at_six() {
    let world = TestWorld::new();
    let seller_id = Uuid::new_v4();
    for minutes in 0..4 {
        world
            .add(with_rec(item("Standard piece", "Stussy", 50.0, seller_id, minutes), AiRecommendation::Standard))
            .await;
    }
    world.add(item("Untagged", "Stussy", 50.0, seller_id, 0)).await;
    world
        .add(with_rec(item("Hold piece", "Stussy", 50.0, seller_id, 10), AiRecommendation::Hold))
        .await;
    world
        .add(with_rec(item("Fast piece", "Stussy", 50.0, seller_id, 20), AiRecommendation::FastSell))
        .await;

    let featured = world.feed.featured().await;
    let titles: Vec<_> = featured.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles.len(), 6);
    assert_eq!(titles[0], "Fast piece");
    assert_eq!(titles[1], "Hold piece");
    assert!(!titles.contains(&"Untagged"));
}

#[tokio::test]
async fn outage_degrades_instead_of_failing() {
    let world = TestWorld::new();
    world.add(item("Anything", "Nike", 100.0, Uuid::new_v4(), 1)).await;
    world.store.set_unavailable(true);

    let outcome = world.feed.feed(&Default::default()).await;
    assert!(outcome.degraded);
    assert!(outcome.items.is_empty());
    assert!(world.feed.trending().await.degraded);

    world.store.set_unavailable(false);
    assert_eq!(world.feed.feed(&Default::default()).await.items.len(), 1);
}

#[tokio::test]
async fn canonical_query_survives_a_round_trip_through_the_feed() {
    let state = filter_codec::decode_query_string("ai=Hold&brands=Bape&sort=price-desc&minPrice=50");
    let canonical = filter_codec::encode_query_string(&state);
    assert_eq!(filter_codec::decode_query_string(&canonical), state);
}
