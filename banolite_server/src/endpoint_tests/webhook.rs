//! Webhook tests against a real sqlite backend.
//!
//! Signature verification operates on the raw request body, so these tests drive the full middleware stack with
//! hand-signed payloads rather than mocks.
use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use banolite_engine::{
    db_types::{NewProduct, ProductType, Role},
    events::EventProducers,
    order_objects::ChargeEvent,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{AccountManagement, CatalogManagement},
    FulfillmentApi,
    SqliteDatabase,
    DEFAULT_FEE_BPS,
};
use bnl_common::{Money, Secret};
use serde_json::json;

use crate::{
    helpers::calculate_hmac,
    middleware::HmacMiddlewareFactory,
    routes::{CreateOrderRoute, OrderStatusRoute},
    webhook_routes::PaymentWebhookRoute,
};

const WEBHOOK_SECRET: &str = "test-webhook-secret";

async fn test_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Could not open test database")
}

/// Seeds a seller with one $10 product and returns the product id.
async fn seed_product(db: &SqliteDatabase) -> String {
    db.create_profile("sally", "Sally", "sally@example.com", Role::Seller).await.expect("Could not seed seller");
    let new = NewProduct {
        title: "Async for everyone".to_string(),
        description: "A short course".to_string(),
        price: Money::from(1000),
        product_type: ProductType::Course,
        cover_url: None,
        file_url: None,
    };
    db.insert_product("sally", new).await.expect("Could not seed product").id
}

async fn call(db: &SqliteDatabase, hmac_checks: bool, req: TestRequest) -> Result<(StatusCode, String), String> {
    let api = FulfillmentApi::new(db.clone(), EventProducers::default(), DEFAULT_FEE_BPS);
    let app = App::new()
        .app_data(web::Data::new(api))
        .service(CreateOrderRoute::<SqliteDatabase>::new())
        .service(OrderStatusRoute::<SqliteDatabase>::new())
        .service(
            web::scope("/webhook")
                .wrap(HmacMiddlewareFactory::new(
                    "x-payment-signature",
                    Secret::new(WEBHOOK_SECRET.to_string()),
                    hmac_checks,
                ))
                .service(PaymentWebhookRoute::<SqliteDatabase>::new()),
        );
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// Places a 2 x $10 guest order for the product and returns the order id.
async fn place_order(db: &SqliteDatabase, product_id: &str) -> String {
    let body = json!({
        "email": "alice@example.com",
        "total": 2000,
        "items": [{ "product_id": product_id, "price": 1000, "quantity": 2 }]
    });
    let req = TestRequest::post().uri("/orders").set_json(body);
    let (status, body) = call(db, true, req).await.expect("Order creation failed");
    assert_eq!(status, StatusCode::CREATED);
    let value: serde_json::Value = serde_json::from_str(&body).expect("Invalid order response");
    value["order_id"].as_str().expect("No order id in response").to_string()
}

fn signed_webhook(event: &ChargeEvent) -> TestRequest {
    let body = serde_json::to_string(event).expect("Could not serialize event");
    let signature = calculate_hmac(WEBHOOK_SECRET, body.as_bytes());
    TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("content-type", "application/json"))
        .insert_header(("x-payment-signature", signature))
        .set_payload(body)
}

#[actix_web::test]
async fn webhook_without_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let event = ChargeEvent::success(&order_id);
    let req = TestRequest::post().uri("/webhook/payment").set_json(&event);
    let err = call(&db, true, req).await.expect_err("Expected error");
    assert_eq!(err, "No HMAC signature found.");
    // and the order is untouched
    let (status, body) = call(&db, true, TestRequest::get().uri(&format!("/order/{order_id}"))).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Pending"), "unexpected body: {body}");
}

#[actix_web::test]
async fn webhook_with_bad_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let event = ChargeEvent::success(&order_id);
    let body = serde_json::to_string(&event).unwrap();
    let signature = calculate_hmac("the-wrong-secret", body.as_bytes());
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("content-type", "application/json"))
        .insert_header(("x-payment-signature", signature))
        .set_payload(body);
    let err = call(&db, true, req).await.expect_err("Expected error");
    assert_eq!(err, "Invalid HMAC signature.");
}

#[actix_web::test]
async fn signed_charge_completes_the_order() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let event = ChargeEvent::success(&order_id);
    let (status, body) = call(&db, true, signed_webhook(&event)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("fulfilled"), "unexpected body: {body}");
    // polling now sees the completed order
    let (status, body) = call(&db, true, TestRequest::get().uri(&format!("/order/{order_id}"))).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Completed"), "unexpected body: {body}");
    // and the seller got $19.00 of the $20.00 at the 5% platform fee
    let seller = db.fetch_profile("sally").await.unwrap().unwrap();
    assert_eq!(seller.wallet_balance, Money::from(1900));
}

#[actix_web::test]
async fn duplicate_deliveries_are_acknowledged_once() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let event = ChargeEvent::success(&order_id);
    let (status, _) = call(&db, true, signed_webhook(&event)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&db, true, signed_webhook(&event)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("already processed"), "unexpected body: {body}");
    // the wallet was only credited once
    let seller = db.fetch_profile("sally").await.unwrap().unwrap();
    assert_eq!(seller.wallet_balance, Money::from(1900));
}

#[actix_web::test]
async fn unknown_payment_reference_is_a_404() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let event = ChargeEvent::success("no-such-order");
    let (status, body) = call(&db, true, signed_webhook(&event)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #no-such-order"}"#);
}

#[actix_web::test]
async fn non_success_events_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let mut event = ChargeEvent::success(&order_id);
    event.event = "charge.dispute".to_string();
    let (status, body) = call(&db, true, signed_webhook(&event)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ignored"), "unexpected body: {body}");
}

#[actix_web::test]
async fn signature_checks_can_be_disabled() {
    let _ = env_logger::try_init().ok();
    let db = test_db().await;
    let product_id = seed_product(&db).await;
    let order_id = place_order(&db, &product_id).await;
    let event = ChargeEvent::success(&order_id);
    let req = TestRequest::post().uri("/webhook/payment").set_json(&event);
    let (status, body) = call(&db, false, req).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("fulfilled"), "unexpected body: {body}");
}
