use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use banolite_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AccountApi,
    AuthApi,
    CatalogApi,
    FulfillmentApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{ChatApi, EmailApi, ObjectStorage, MAX_UPLOAD_BYTES},
    middleware::{BearerAuthFactory, HmacMiddlewareFactory},
    routes::{
        self,
        health,
        AdminUsersRoute,
        CreateOrderRoute,
        CreateProductRoute,
        MarkNotificationReadRoute,
        MyNotificationsRoute,
        MyOrdersRoute,
        MyProfileRoute,
        OrderStatusRoute,
        ProductByIdRoute,
        ProductsRoute,
        UpdateMyProfileRoute,
    },
    webhook_routes::PaymentWebhookRoute,
};

/// The size of the event channel buffers. Fulfillment only blocks on a hook if a handler falls this far behind.
const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, build_event_hooks(&config)?);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Wires the side channels that fire after an order completes. Email delivery is optional; when it is not
/// configured, completion still works and the hooks simply stay empty.
fn build_event_hooks(config: &ServerConfig) -> Result<EventHooks, ServerError> {
    let mut hooks = EventHooks::default();
    if config.email.is_configured() {
        let mailer = Arc::new(EmailApi::new(config.email.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?);
        let receipt_mailer = Arc::clone(&mailer);
        hooks.on_order_completed(move |event| {
            let mailer = Arc::clone(&receipt_mailer);
            Box::pin(async move {
                if let Err(e) = mailer.send_order_receipt(&event).await {
                    error!("📧️ Could not send receipt for order {}: {e}", event.order.id);
                }
            })
        });
        hooks.on_seller_sale(move |event| {
            let mailer = Arc::clone(&mailer);
            Box::pin(async move {
                if let Err(e) = mailer.send_sale_alert(&event).await {
                    error!("📧️ Could not send sale alert to seller [{}]: {e}", event.seller.id);
                }
            })
        });
        info!("📧️ Email hooks are live. Receipts and sale alerts will be sent.");
    } else {
        info!("📧️ Email delivery is not configured. Receipts and sale alerts will not be sent.");
    }
    Ok(hooks)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let storage = ObjectStorage::new(&config.storage);
    let chat = ChatApi::new(config.chat.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let fee_bps = config.fee_bps;
    let payment = config.payment.clone();
    let srv = HttpServer::new(move || {
        let fulfillment_api = FulfillmentApi::new(db.clone(), producers.clone(), fee_bps);
        let accounts_api = AccountApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let auth_api = Arc::new(AuthApi::new(db.clone()));
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bnl::access_log"))
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(chat.clone()));
        // Routes that require (or can use) a bearer token
        let auth_scope = web::scope("/api")
            .wrap(BearerAuthFactory::new(auth_api))
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(UpdateMyProfileRoute::<SqliteDatabase>::new())
            .service(MyNotificationsRoute::<SqliteDatabase>::new())
            .service(MarkNotificationReadRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(AdminUsersRoute::<SqliteDatabase>::new())
            .service(routes::upload)
            .service(routes::chat);
        // The payment provider scope. Every request must carry a valid body signature to get past the middleware.
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(
                &payment.signature_header,
                payment.webhook_secret.clone(),
                payment.hmac_checks,
            ))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(OrderStatusRoute::<SqliteDatabase>::new())
            .service(auth_scope)
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
