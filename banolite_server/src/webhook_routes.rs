//! Payment webhook handlers.
//!
//! These routes live on their own scope so that the HMAC middleware can be applied to them and nothing else. By
//! the time a handler here runs, the request signature has already been checked against the raw body.
use actix_web::{web, HttpResponse};
use banolite_engine::{
    order_objects::{ChargeEvent, FulfillmentOutcome},
    traits::FulfillmentDatabase,
    FulfillmentApi,
};
use log::*;

use crate::{data_objects::JsonResponse, errors::ServerError, route};

route!(payment_webhook => Post "/payment" impl FulfillmentDatabase);
/// Route handler for payment provider charge events.
///
/// The provider retries deliveries until it sees a 2xx, so every recognised-but-uninteresting case (duplicate
/// delivery, event type we don't act on) is acknowledged with a 200. Only an unknown payment reference is a 404,
/// and a signature failure never reaches this handler at all.
pub async fn payment_webhook<B: FulfillmentDatabase>(
    body: web::Json<ChargeEvent>,
    api: web::Data<FulfillmentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let event = body.into_inner();
    debug!("🔄️🛍️ Charge event received: {} for {}", event.event, event.data.reference);
    let outcome = api.process_charge_event(event).await?;
    let response = match outcome {
        FulfillmentOutcome::Completed(receipt) => {
            info!("🔄️🛍️ Order {} fulfilled. {} seller payout(s) made.", receipt.order.id, receipt.payouts.len());
            JsonResponse::success(format!("Order {} fulfilled", receipt.order.id))
        },
        FulfillmentOutcome::AlreadyProcessed(order) => {
            info!("🔄️🛍️ Order {} was already processed. Acknowledging duplicate delivery.", order.id);
            JsonResponse::success(format!("Order {} already processed", order.id))
        },
        FulfillmentOutcome::Ignored(event_type) => {
            debug!("🔄️🛍️ Ignoring charge event of type {event_type}");
            JsonResponse::success(format!("Event {event_type} ignored"))
        },
    };
    Ok(HttpResponse::Ok().json(response))
}
