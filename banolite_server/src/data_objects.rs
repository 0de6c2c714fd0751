use std::fmt::Display;

use banolite_engine::db_types::{NewOrder, NewOrderItem, OrderId, OrderStatusType, GUEST_USER_ID};
use bnl_common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The cart snapshot the storefront submits at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub email: String,
    pub total: Money,
    /// Required when the cart contains a coaching session.
    #[serde(default)]
    pub booking_date: Option<String>,
    /// Required when the cart contains a ticket.
    #[serde(default)]
    pub attendee_name: Option<String>,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub price: Money,
    pub quantity: i64,
}

impl NewOrderRequest {
    /// The order the request maps to. Anonymous checkouts get the guest user id.
    pub fn into_new_order(self, user_id: Option<String>) -> NewOrder {
        let mut order =
            NewOrder::new(user_id.unwrap_or_else(|| GUEST_USER_ID.to_string()), self.email, self.total);
        order.booking_date = self.booking_date;
        order.attendee_name = self.attendee_name;
        for item in self.items {
            order = order.with_item(NewOrderItem::new(item.product_id, item.price, item.quantity));
        }
        order
    }
}

/// What the checkout client gets back after creating a pending order. The id doubles as the payment reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Query parameters for `POST /api/upload`. The body carries the raw file bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadParams {
    pub bucket: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
