use actix_web::{http::StatusCode, web, web::ServiceConfig};
use banolite_engine::{db_types::Role, AccountApi};

use super::helpers::{get_request, profile, ADMIN_TOKEN, BUYER_TOKEN, SELLER_TOKEN};
use crate::{endpoint_tests::mocks::MockAccountManager, routes::AdminUsersRoute};

#[actix_web::test]
async fn listing_users_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/admin/users", configure).await.expect_err("Expected error");
    assert_eq!(err, "Authentication required");
}

#[actix_web::test]
async fn buyers_may_not_list_users() {
    let _ = env_logger::try_init().ok();
    let err = get_request(BUYER_TOKEN, "/admin/users", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn sellers_may_not_list_users_either() {
    let _ = env_logger::try_init().ok();
    let err = get_request(SELLER_TOKEN, "/admin/users", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn admins_list_users() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(ADMIN_TOKEN, "/admin/users", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":"alice""#), "unexpected body: {body}");
    assert!(body.contains(r#""id":"sally""#), "unexpected body: {body}");
}

fn configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_profiles()
        .returning(|| Ok(vec![profile("alice", Role::Buyer), profile("sally", Role::Seller)]));
    let accounts_api = AccountApi::new(account_manager);
    cfg.service(AdminUsersRoute::<MockAccountManager>::new()).app_data(web::Data::new(accounts_api));
}
