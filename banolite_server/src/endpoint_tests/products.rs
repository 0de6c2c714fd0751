use actix_web::{http::StatusCode, web, web::ServiceConfig};
use banolite_engine::{
    db_types::{Product, ProductType},
    traits::CatalogApiError,
    CatalogApi,
};
use bnl_common::Money;
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::helpers::{get_request, post_request, ADMIN_TOKEN, BUYER_TOKEN, SELLER_TOKEN};
use crate::{
    endpoint_tests::mocks::MockCatalogManager,
    routes::{CreateProductRoute, ProductByIdRoute, ProductsRoute},
};

#[actix_web::test]
async fn browse_products_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""title":"Sqlite for sailors""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn fetch_unknown_product() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/nope", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Product nope"}"#);
}

#[actix_web::test]
async fn buyers_cannot_create_products() {
    let _ = env_logger::try_init().ok();
    let err = post_request(BUYER_TOKEN, "/products", new_product_body(), configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn anonymous_callers_cannot_create_products() {
    let _ = env_logger::try_init().ok();
    let err = post_request("", "/products", new_product_body(), configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication required");
}

#[actix_web::test]
async fn sellers_create_products() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(SELLER_TOKEN, "/products", new_product_body(), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""creator_id":"sally""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn admins_create_products_too() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        post_request(ADMIN_TOKEN, "/products", new_product_body(), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
}

fn new_product_body() -> serde_json::Value {
    json!({
        "title": "Rust for sailors",
        "description": "Knots, ropes and lifetimes",
        "price": 2500,
        "product_type": "Ebook",
        "cover_url": null,
        "file_url": null
    })
}

fn product(id: &str, creator_id: &str, title: &str, price: i64) -> Product {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Product {
        id: id.to_string(),
        creator_id: creator_id.to_string(),
        title: title.to_string(),
        description: "A test product".to_string(),
        price: Money::from(price),
        product_type: ProductType::Ebook,
        cover_url: None,
        file_url: None,
        sales_count: 0,
        created_at: ts,
        updated_at: ts,
    }
}

fn configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog.expect_fetch_products().returning(|| Ok(vec![product("p1", "sally", "Sqlite for sailors", 1500)]));
    catalog.expect_fetch_product().returning(|id| match id {
        "p1" => Ok(Some(product("p1", "sally", "Sqlite for sailors", 1500))),
        _ => Ok(None),
    });
    catalog.expect_insert_product().returning(|creator_id, new| {
        let mut product = product("p2", creator_id, "placeholder", 0);
        product.title = new.title;
        product.price = new.price;
        Ok::<_, CatalogApiError>(product)
    });
    let catalog_api = CatalogApi::new(catalog);
    cfg.service(ProductsRoute::<MockCatalogManager>::new())
        .service(ProductByIdRoute::<MockCatalogManager>::new())
        .service(CreateProductRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(catalog_api));
}
