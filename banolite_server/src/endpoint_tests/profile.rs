use actix_web::{http::StatusCode, web, web::ServiceConfig};
use banolite_engine::{db_types::Role, AccountApi};
use serde_json::json;

use super::helpers::{get_request, patch_request, post_request, profile, BUYER_TOKEN, STALE_TOKEN};
use crate::{
    endpoint_tests::mocks::MockAccountManager,
    routes::{MarkNotificationReadRoute, MyNotificationsRoute, MyProfileRoute, UpdateMyProfileRoute},
};

#[actix_web::test]
async fn fetch_my_profile_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/profile", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn fetch_my_profile_with_garbage_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("no-such-token", "/profile", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. The access token is not valid.");
}

#[actix_web::test]
async fn fetch_my_profile_with_expired_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request(STALE_TOKEN, "/profile", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. The access token has expired.");
}

#[actix_web::test]
async fn fetch_my_profile() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(BUYER_TOKEN, "/profile", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":"alice""#), "unexpected body: {body}");
    assert!(body.contains(r#""role":"buyer""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn update_my_profile() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(BUYER_TOKEN, "/profile", json!({"name": "Alice P"}), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""name":"Alice P""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn update_my_storefront_details() {
    let _ = env_logger::try_init().ok();
    let body = json!({"store_name": "Alice's Loops", "bio": "Drum loops and sample packs"});
    let (status, body) = patch_request(BUYER_TOKEN, "/profile", body, configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""store_name":"Alice's Loops""#), "unexpected body: {body}");
    assert!(body.contains(r#""bio":"Drum loops and sample packs""#), "unexpected body: {body}");
}

#[actix_web::test]
async fn update_my_profile_with_nothing_to_update() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(BUYER_TOKEN, "/profile", json!({}), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: Nothing to update"}"#);
}

#[actix_web::test]
async fn mark_notification_read() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        post_request(BUYER_TOKEN, "/notifications/5/read", json!({}), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn fetch_notifications() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(BUYER_TOKEN, "/notifications", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_profile().returning(|id| Ok(Some(profile(id, Role::Buyer))));
    account_manager.expect_update_profile().returning(|id, update| {
        if update.is_empty() {
            return Err(banolite_engine::traits::AccountApiError::EmptyUpdate);
        }
        let mut profile = profile(id, Role::Buyer);
        if let Some(name) = update.name {
            profile.name = name;
        }
        profile.store_name = update.store_name.or(profile.store_name);
        profile.bio = update.bio.or(profile.bio);
        Ok(profile)
    });
    account_manager.expect_fetch_notifications().returning(|_| Ok(vec![]));
    account_manager.expect_mark_notification_read().withf(|user_id, id| user_id == "alice" && *id == 5).returning(|_, _| Ok(()));
    let accounts_api = AccountApi::new(account_manager);
    cfg.service(MyProfileRoute::<MockAccountManager>::new())
        .service(UpdateMyProfileRoute::<MockAccountManager>::new())
        .service(MyNotificationsRoute::<MockAccountManager>::new())
        .service(MarkNotificationReadRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(accounts_api));
}
