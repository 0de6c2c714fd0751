use bnl_common::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderId, OrderItem, OrderStatusType};

/// The event type the payment provider sends for a successful charge. Anything else is acknowledged and ignored.
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// The body of a payment provider webhook call, as delivered to `POST /webhook/payment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeEvent {
    pub event: String,
    pub data: ChargeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeData {
    /// The payment reference, which is the order id we handed to the payment widget at checkout.
    pub reference: String,
    /// The charged amount in cents, as reported by the provider.
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl ChargeEvent {
    pub fn success<S: Into<String>>(reference: S) -> Self {
        Self {
            event: CHARGE_SUCCESS_EVENT.to_string(),
            data: ChargeData { reference: reference.into(), amount: None, paid_at: None },
        }
    }

    pub fn is_success(&self) -> bool {
        self.event == CHARGE_SUCCESS_EVENT
    }
}

/// The polling target's view of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusSummary {
    pub id: OrderId,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderStatusSummary {
    fn from(order: Order) -> Self {
        Self { id: order.id, status: order.status, created_at: order.created_at }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// An order line that was actually fulfilled, i.e. its product still existed when the charge landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfilledItem {
    pub product_id: String,
    pub title: String,
    pub price: Money,
    pub quantity: i64,
}

/// What one seller earned on a completed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerPayout {
    pub seller_id: String,
    /// Σ price × quantity over the seller's lines.
    pub gross: Money,
    /// The platform's cut.
    pub fee: Money,
    /// What was credited to the seller's wallet.
    pub net: Money,
    pub item_count: i64,
    pub product_titles: Vec<String>,
}

/// The result of processing a charge event.
#[derive(Debug, Clone)]
pub enum FulfillmentOutcome {
    /// The order was freshly completed by this event.
    Completed(Box<FulfillmentReceipt>),
    /// The order had already left the `Pending` state. Nothing was re-applied.
    AlreadyProcessed(Order),
    /// The event type is not one we act on.
    Ignored(String),
}

#[derive(Debug, Clone)]
pub struct FulfillmentReceipt {
    pub order: Order,
    pub items: Vec<FulfilledItem>,
    pub payouts: Vec<SellerPayout>,
}
