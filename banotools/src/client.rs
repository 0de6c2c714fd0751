use anyhow::{anyhow, Result};
use banolite_engine::{
    db_types::{OrderId, Product},
    order_objects::OrderStatusSummary,
};
use banolite_server::data_objects::{NewOrderRequest, OrderCreatedResponse};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    StatusCode,
};
use url::Url;

/// A thin HTTP client for the Banolite server.
pub struct BanoliteClient {
    client: Client,
    server: Url,
}

impl BanoliteClient {
    pub fn new(server: &str) -> Result<Self> {
        let server = Url::parse(server).map_err(|e| anyhow!("Invalid server URL: {e}"))?;
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("Banolite CLI")
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;
        Ok(BanoliteClient { client, server })
    }

    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.server.join(path).map_err(|e| anyhow!("Failed to join URL: {e}"))
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        let response = res.text().await?;
        Ok(response)
    }

    pub async fn product(&self, product_id: &str) -> Result<Product> {
        let url = self.url(&format!("/products/{product_id}"))?;
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(anyhow!("No product with id {product_id} exists on {}", self.server()));
        }
        let product = res.error_for_status()?.json::<Product>().await?;
        Ok(product)
    }

    /// Submits the cart and returns the pending order. The returned order id is the payment reference.
    pub async fn create_order(&self, order: &NewOrderRequest) -> Result<OrderCreatedResponse> {
        let url = self.url("/api/orders")?;
        let res = self.client.post(url).json(order).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("The server rejected the order. {reason}"));
        }
        let order = res.json::<OrderCreatedResponse>().await?;
        Ok(order)
    }

    pub async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatusSummary> {
        let url = self.url(&format!("/order/{}", order_id.as_str()))?;
        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(anyhow!("No order with id {order_id} exists on {}", self.server()));
        }
        let summary = res.error_for_status()?.json::<OrderStatusSummary>().await?;
        Ok(summary)
    }
}
