//! Bearer-token middleware.
//!
//! Resolves the `Authorization: Bearer ...` header against the token store and inserts [`AuthClaims`] into the
//! request extensions. Requests without the header pass through unauthenticated, so routes that allow guests can sit
//! behind this middleware too; a header that is present but invalid is rejected immediately, before any handler
//! runs.
use std::{
    future::{ready, Ready},
    pin::Pin,
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use banolite_engine::{traits::AuthManagement, AuthApi};
use futures::Future;
use log::{debug, trace};

use crate::{auth::AuthClaims, errors::ServerError};

pub struct BearerAuthFactory<B: AuthManagement> {
    auth: Arc<AuthApi<B>>,
}

impl<B: AuthManagement> BearerAuthFactory<B> {
    pub fn new(auth: Arc<AuthApi<B>>) -> Self {
        Self { auth }
    }
}

impl<S, B, Body> Transform<S, ServiceRequest> for BearerAuthFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AuthManagement + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<Body>;
    type Transform = BearerAuthService<S, B>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthService { auth: Arc::clone(&self.auth), service: Rc::new(service) }))
    }
}

pub struct BearerAuthService<S, B: AuthManagement> {
    auth: Arc<AuthApi<B>>,
    service: Rc<S>,
}

impl<S, B, Body> Service<ServiceRequest> for BearerAuthService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    B: AuthManagement + 'static,
    Body: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<Body>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = Arc::clone(&self.auth);
        Box::pin(async move {
            let header = req.headers().get("Authorization").and_then(|v| v.to_str().ok()).map(str::to_string);
            let token = header.as_deref().and_then(crate::auth::extract_bearer);
            match (header, token) {
                // no credentials at all, continue as guest
                (None, _) => service.call(req).await,
                (Some(_), None) => {
                    debug!("🔐️ Authorization header is present but not a bearer token. Rejecting.");
                    Err(ServerError::AuthenticationError(crate::errors::AuthError::InvalidToken).into())
                },
                (Some(_), Some(token)) => {
                    let profile = auth.profile_for_token(&token).await.map_err(ServerError::from)?;
                    trace!("🔐️ Bearer token resolved to [{}]", profile.id);
                    req.extensions_mut().insert(AuthClaims::from(&profile));
                    service.call(req).await
                },
            }
        })
    }
}
