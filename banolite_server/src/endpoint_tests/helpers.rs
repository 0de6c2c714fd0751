use std::sync::Arc;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use banolite_engine::{
    db_types::{Profile, Role},
    traits::AuthApiError,
    AuthApi,
};
use bnl_common::Money;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use super::mocks::MockAuthManager;
use crate::middleware::BearerAuthFactory;

/// A profile fixture with a fixed timestamp so serialized responses are deterministic.
pub fn profile(id: &str, role: Role) -> Profile {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Profile {
        id: id.to_string(),
        name: format!("{id} mcTestface"),
        email: format!("{id}@example.com"),
        role,
        wallet_balance: Money::from(0),
        purchased_product_ids: vec![],
        store_name: None,
        bio: None,
        avatar_url: None,
        created_at: ts,
        updated_at: ts,
    }
}

// The well-known test tokens. The auth stub resolves these and nothing else.
pub const BUYER_TOKEN: &str = "buyer-token";
pub const SELLER_TOKEN: &str = "seller-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const STALE_TOKEN: &str = "stale-token";

fn auth_stub() -> MockAuthManager {
    let mut auth = MockAuthManager::new();
    auth.expect_profile_for_token().returning(|token| match token {
        BUYER_TOKEN => Ok(profile("alice", Role::Buyer)),
        SELLER_TOKEN => Ok(profile("sally", Role::Seller)),
        ADMIN_TOKEN => Ok(profile("root", Role::Admin)),
        STALE_TOKEN => Err(AuthApiError::TokenExpired),
        _ => Err(AuthApiError::InvalidToken),
    });
    auth
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send(TestRequest::get().uri(path), token, configure).await
}

pub async fn post_request(
    token: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send(TestRequest::post().uri(path).set_json(body), token, configure).await
}

pub async fn patch_request(
    token: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send(TestRequest::patch().uri(path).set_json(body), token, configure).await
}

async fn send(
    mut req: TestRequest,
    token: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !token.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {token}")));
    }
    let auth_api = Arc::new(AuthApi::new(auth_stub()));
    let app = App::new().wrap(BearerAuthFactory::new(auth_api)).configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
