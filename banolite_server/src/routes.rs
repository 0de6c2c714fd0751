//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don't block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, post, web, HttpResponse, Responder};
use banolite_engine::{
    db_types::{NewProduct, OrderId, ProfileUpdate, Role},
    traits::{AccountManagement, CatalogManagement, FulfillmentDatabase},
    AccountApi,
    CatalogApi,
    FulfillmentApi,
};
use log::*;

use crate::{
    auth::AuthClaims,
    data_objects::{ChatRequest, ChatResponse, NewOrderRequest, OrderCreatedResponse, UploadParams, UploadResponse},
    errors::ServerError,
    integrations::{ChatApi, ChatApiError, ObjectStorage, StorageError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl FulfillmentDatabase);
/// Route handler for checkout cart submissions.
///
/// A valid cart snapshot becomes a pending order; the returned order id is the payment reference the client hands
/// to the payment widget. Guests may order too, so authentication is optional here; every other mutation on the
/// `/api` scope requires a bearer token.
pub async fn create_order<B: FulfillmentDatabase>(
    claims: Option<AuthClaims>,
    body: web::Json<NewOrderRequest>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = claims.map(|c| c.user_id);
    debug!("💻️ POST create_order for {}", user_id.as_deref().unwrap_or("a guest"));
    let order = api.create_pending_order(body.into_inner().into_new_order(user_id)).await?;
    let response = OrderCreatedResponse { order_id: order.id, status: order.status, total: order.total };
    Ok(HttpResponse::Created().json(response))
}

route!(order_status => Get "/order/{id}" impl FulfillmentDatabase);
/// Route handler for the order status endpoint.
///
/// This is the endpoint checkout clients poll while the payment widget is open. It is unauthenticated: the order id
/// is an unguessable capability, and guests must be able to poll too.
pub async fn order_status<B: FulfillmentDatabase>(
    path: web::Path<String>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ GET order_status for {order_id}");
    let summary = api.order_status(&order_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

route!(my_orders => Get "/orders" impl FulfillmentDatabase);
pub async fn my_orders<B: FulfillmentDatabase>(
    claims: AuthClaims,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for [{}]", claims.user_id);
    let history = api.order_history(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(history))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(my_profile => Get "/profile" impl AccountManagement);
pub async fn my_profile<B: AccountManagement>(
    claims: AuthClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_profile for [{}]", claims.user_id);
    let profile = api.profile(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

route!(update_my_profile => Patch "/profile" impl AccountManagement);
/// Updates the caller's profile. The update type is an allow-list; fields like `role`, `wallet_balance` and
/// `purchased_product_ids` simply do not exist on it, so they can never be set from the outside.
pub async fn update_my_profile<B: AccountManagement>(
    claims: AuthClaims,
    body: web::Json<ProfileUpdate>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ PATCH my_profile for [{}]", claims.user_id);
    let profile = api.update_profile(&claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Notifications  ----------------------------------------------------
route!(my_notifications => Get "/notifications" impl AccountManagement);
pub async fn my_notifications<B: AccountManagement>(
    claims: AuthClaims,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET my_notifications for [{}]", claims.user_id);
    let notifications = api.notifications(&claims.user_id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

route!(mark_notification_read => Post "/notifications/{id}/read" impl AccountManagement);
pub async fn mark_notification_read<B: AccountManagement>(
    claims: AuthClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ POST mark_notification_read {id} for [{}]", claims.user_id);
    api.mark_notification_read(&claims.user_id, id).await?;
    Ok(HttpResponse::Ok().finish())
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET product {id}");
    let product = api.product(&id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Seller, Role::Admin]);
pub async fn create_product<B: CatalogManagement>(
    claims: AuthClaims,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST create_product by [{}]", claims.user_id);
    let product = api.create_product(&claims.user_id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(admin_users => Get "/admin/users" impl AccountManagement where requires [Role::Admin]);
pub async fn admin_users<B: AccountManagement>(api: web::Data<AccountApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET admin_users");
    let profiles = api.all_profiles().await?;
    Ok(HttpResponse::Ok().json(profiles))
}

//----------------------------------------------   Uploads  ----------------------------------------------------
/// Route handler for file uploads.
///
/// The raw body is the file content; `bucket` and `filename` arrive as query parameters. Only the well-known
/// buckets are accepted and the size cap is enforced before anything touches disk.
#[post("/upload")]
pub async fn upload(
    claims: AuthClaims,
    params: web::Query<UploadParams>,
    body: web::Bytes,
    storage: web::Data<ObjectStorage>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST upload of {} bytes to {} by [{}]", body.len(), params.bucket, claims.user_id);
    let url = storage.store(&params.bucket, &claims.user_id, &params.filename, &body).await.map_err(|e| match e {
        StorageError::WriteError(e) => ServerError::BackendError(e),
        e => ServerError::InvalidRequestBody(e.to_string()),
    })?;
    Ok(HttpResponse::Ok().json(UploadResponse { url }))
}

//----------------------------------------------   Chat  ----------------------------------------------------
#[post("/chat")]
pub async fn chat(
    claims: AuthClaims,
    body: web::Json<ChatRequest>,
    api: web::Data<ChatApi>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ POST chat from [{}]", claims.user_id);
    let reply = api.send(&body.message, body.system_prompt.as_deref()).await.map_err(|e| match e {
        ChatApiError::NotConfigured => ServerError::ConfigurationError(e.to_string()),
        e => ServerError::UpstreamError(e.to_string()),
    })?;
    Ok(HttpResponse::Ok().json(ChatResponse { reply }))
}
