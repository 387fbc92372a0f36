//! Seller endpoints: creating, changing and removing listings, plus the
//! seller's own views.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use domains::ItemStatus;
use integration_tests::http::{body_json, multipart, Part, TestApp, BOUNDARY};
use integration_tests::{item, with_status, FIXED_BASE_PRICE, PNG};
use serde_json::json;
use uuid::Uuid;

fn listing_request(app: &TestApp, seller_id: Option<Uuid>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::post("/api/listings")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(seller_id) = seller_id {
        builder = builder.header(header::AUTHORIZATION, app.bearer(seller_id));
    }
    builder.body(Body::from(multipart(parts))).unwrap()
}

fn hoodie_fields<'a>() -> Vec<Part<'a>> {
    vec![
        Part::Text("title", "Supreme Box Logo Hoodie"),
        Part::Text("brand", "Supreme"),
        Part::Text("size", "L"),
        Part::Text("condition", "Like New"),
        Part::Text("description", "FW17, worn once."),
    ]
}

#[tokio::test]
async fn creates_listing_from_multipart_form() {
    let app = TestApp::new();
    let seller_id = Uuid::new_v4();
    let mut parts = vec![Part::File("photos", PNG), Part::File("photos", PNG)];
    parts.extend(hoodie_fields());
    parts.push(Part::Text("sell_speed", "50"));

    let response = app.send(listing_request(&app, Some(seller_id), &parts)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["price"], FIXED_BASE_PRICE);
    assert_eq!(created["dropped_photos"], 0);

    let id = created["id"].as_str().unwrap().to_string();
    let detail = body_json(app.get(&format!("/api/items/{id}")).await).await;
    assert_eq!(detail["item"]["title"], "Supreme Box Logo Hoodie");
    assert_eq!(detail["item"]["seller_id"], seller_id.to_string());
    assert_eq!(detail["item"]["status"], "active");
    assert_eq!(detail["item"]["ai_recommendation"], "Standard");
    assert_eq!(detail["images"].as_array().unwrap().len(), 2);
    assert_eq!(app.world.media.len(), 2);
}

#[tokio::test]
async fn client_price_and_extra_photos() {
    let app = TestApp::new();
    let mut parts = vec![Part::File("photo", PNG); 5];
    parts.extend(hoodie_fields());
    parts.push(Part::Text("price", "480"));

    let response = app.send(listing_request(&app, Some(Uuid::new_v4()), &parts)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["price"], 480);
    assert_eq!(created["dropped_photos"], 1);
    assert_eq!(app.world.media.len(), 4);
}

#[tokio::test]
async fn extra_photo_is_dropped_even_when_not_an_image() {
    let app = TestApp::new();
    let mut parts = vec![Part::File("photo", PNG); 4];
    parts.push(Part::File("photo", b"plain text".as_slice()));
    parts.extend(hoodie_fields());
    parts.push(Part::Text("price", "480"));

    let response = app.send(listing_request(&app, Some(Uuid::new_v4()), &parts)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["dropped_photos"], 1);
    assert_eq!(app.world.media.len(), 4);
}

#[tokio::test]
async fn rejects_invalid_listing_forms() {
    let app = TestApp::new();
    let seller_id = Uuid::new_v4();

    let not_an_image = [vec![Part::File("photo", b"plain text".as_slice())], hoodie_fields()].concat();
    let response = app.send(listing_request(&app, Some(seller_id), &not_an_image)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "VALIDATION_ERROR");

    let no_photos = hoodie_fields();
    let response = app.send(listing_request(&app, Some(seller_id), &no_photos)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let missing_brand = vec![Part::File("photo", PNG), Part::Text("title", "Tee"), Part::Text("size", "M")];
    let response = app.send(listing_request(&app, Some(seller_id), &missing_brand)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.contains("brand"));

    let bad_speed = [vec![Part::File("photo", PNG)], hoodie_fields(), vec![Part::Text("sell_speed", "fast")]].concat();
    let response = app.send(listing_request(&app, Some(seller_id), &bad_speed)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.world.feed.feed(&Default::default()).await.items.is_empty());
}

#[tokio::test]
async fn seller_routes_require_a_valid_token() {
    let app = TestApp::new();
    let parts = [vec![Part::File("photo", PNG)], hoodie_fields()].concat();

    let response = app.send(listing_request(&app, None, &parts)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "UNAUTHORIZED");

    let forged = Request::get("/api/me/items")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(forged).await.status(), StatusCode::UNAUTHORIZED);

    let wrong_scheme = Request::get("/api/user-stats")
        .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(wrong_scheme).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn status_changes_follow_ownership_and_lifecycle() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let id = app.world.add(item("Bape Shark Hoodie", "Bape", 320.0, owner, 1)).await;
    let uri = format!("/api/items/{id}/status");

    let response = app.json_as(Method::POST, &uri, Uuid::new_v4(), json!({ "status": "sold" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.json_as(Method::POST, &uri, owner, json!({ "status": "sold" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "sold");

    let response = app.json_as(Method::POST, &uri, owner, json!({ "status": "active" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "INVALID_TRANSITION");

    let response = app.json_as(Method::POST, &uri, owner, json!({ "status": "archived" })).await;
    assert!(response.status().is_client_error());

    let missing = format!("/api/items/{}/status", Uuid::new_v4());
    let response = app.json_as(Method::POST, &missing, owner, json!({ "status": "sold" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_can_delete() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    let id = app.world.add(item("Off-White Belt", "Off-White", 180.0, owner, 1)).await;
    let uri = format!("/api/items/{id}");

    let stranger = Request::delete(&uri)
        .header(header::AUTHORIZATION, app.bearer(Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(stranger).await.status(), StatusCode::FORBIDDEN);

    let request = Request::delete(&uri)
        .header(header::AUTHORIZATION, app.bearer(owner))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.get(&uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seller_views_cover_every_status() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();
    app.world.add(item("Active A", "Kith", 100.0, owner, 5)).await;
    app.world.add(item("Active B", "Kith", 200.0, owner, 4)).await;
    app.world.add(with_status(item("Sold", "Kith", 300.0, owner, 3), ItemStatus::Sold)).await;
    app.world.add(with_status(item("Pending", "Kith", 50.0, owner, 2), ItemStatus::Pending)).await;
    app.world.add(item("Someone else's", "Kith", 999.0, Uuid::new_v4(), 1)).await;

    let mine = body_json(app.get_as("/api/me/items", owner).await).await;
    let titles: Vec<_> = mine["items"].as_array().unwrap().iter().map(|i| i["title"].clone()).collect();
    assert_eq!(titles, vec!["Pending", "Sold", "Active B", "Active A"]);

    let stats = body_json(app.get_as("/api/user-stats", owner).await).await;
    assert_eq!(stats["sold_count"], 1);
    assert_eq!(stats["active_count"], 2);
    assert_eq!(stats["total_sales_value"], 300.0);
    assert_eq!(stats["average_price"], 150.0);
    assert_eq!(stats["top_items"][0]["title"], "Active B");
    assert_eq!(stats["status_breakdown"]["pending"], 1);
    assert_eq!(stats["degraded"], false);
}

#[tokio::test]
async fn price_suggestion_scales_with_sell_speed() {
    let app = TestApp::new();
    let response = app
        .json_as(Method::POST, "/api/price-suggestion", Uuid::new_v4(), json!({ "sell_speed": 80 }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["price"], FIXED_BASE_PRICE * 80 / 50);
    assert_eq!(body["recommendation"], "Hold");
}
