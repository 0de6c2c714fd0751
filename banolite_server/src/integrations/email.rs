use std::sync::Arc;

use banolite_engine::events::{OrderCompletedEvent, SellerSaleEvent};
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Debug, Clone, Error)]
pub enum EmailApiError {
    #[error("Could not initialize the email client. {0}")]
    Initialization(String),
    #[error("The email service rejected the request: {status} {message}")]
    SendError { status: u16, message: String },
    #[error("Could not reach the email service. {0}")]
    ResponseError(String),
}

#[derive(Debug, Serialize)]
struct EmailPayload {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

/// Thin client for the transactional email service. Receipts and sale alerts are sent out-of-band from the event
/// hooks, so a slow or broken email service never holds up a webhook response.
#[derive(Clone)]
pub struct EmailApi {
    config: EmailConfig,
    client: Arc<Client>,
}

impl EmailApi {
    pub fn new(config: EmailConfig) -> Result<Self, EmailApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| EmailApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| EmailApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// The order receipt, sent to the buyer when their order completes.
    pub async fn send_order_receipt(&self, event: &OrderCompletedEvent) -> Result<(), EmailApiError> {
        let lines = event
            .items
            .iter()
            .map(|i| format!("<li>{} × {} ({})</li>", i.title, i.quantity, i.price))
            .collect::<Vec<_>>()
            .join("");
        let html = format!(
            "<h1>Thanks for your purchase, {}!</h1><p>Order {} is complete.</p><ul>{lines}</ul><p>Total: {}</p>",
            event.buyer_name, event.order.id, event.order.total
        );
        let subject = format!("Your receipt for order {}", event.order.id);
        self.send(&event.order.email, &subject, &html).await
    }

    /// The sale alert, sent to a seller when one of their products is bought.
    pub async fn send_sale_alert(&self, event: &SellerSaleEvent) -> Result<(), EmailApiError> {
        let titles = event.payout.product_titles.join(", ");
        let html = format!(
            "<h1>You made a sale!</h1><p>{} bought {titles}.</p><p>{} was credited to your wallet after the platform \
             fee of {}.</p>",
            event.buyer_name, event.payout.net, event.payout.fee
        );
        let subject = format!("New sale on order {}", event.order_id);
        self.send(&event.seller.email, &subject, &html).await
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), EmailApiError> {
        let payload = EmailPayload {
            from: self.config.sender.clone(),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };
        let url = format!("{}/emails", self.config.base_url);
        trace!("📧️ Sending email to {to}: {subject}");
        let response =
            self.client.post(url).json(&payload).send().await.map_err(|e| EmailApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            debug!("📧️ Email to {to} accepted by the email service");
            Ok(())
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| EmailApiError::ResponseError(e.to_string()))?;
            Err(EmailApiError::SendError { status, message })
        }
    }
}
