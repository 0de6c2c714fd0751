//! Bearer-token authentication.
//!
//! Identity lives with the external auth provider; the server only resolves opaque bearer tokens against the token
//! store via [`banolite_engine::AuthApi`]. The [`crate::middleware::BearerAuthFactory`] middleware does the lookup
//! and inserts [`AuthClaims`] into the request extensions, from where handlers extract them.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use banolite_engine::db_types::{Profile, Role};
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, ServerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&Profile> for AuthClaims {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
        }
    }
}

impl FromRequest for AuthClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<AuthClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)))
    }
}

///// Pulls the token out of an `Authorization: Bearer ...` header, if there is one.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    extract_bearer(req.headers().get("Authorization")?.to_str().ok()?)
}

pub(crate) fn extract_bearer(header: &str) -> Option<String> {
    let token = header.strip_prefix("Bearer ").or_else(|| header.strip_prefix("bearer "))?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::extract_bearer;

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer("Bearer abc123"), Some("abc123".to_string()));
        assert_eq!(extract_bearer("bearer abc123"), Some("abc123".to_string()));
        assert_eq!(extract_bearer("Basic abc123"), None);
        assert_eq!(extract_bearer("Bearer "), None);
    }
}
