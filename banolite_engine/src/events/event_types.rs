use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderId, Profile},
    order_objects::{FulfilledItem, SellerPayout},
};

/// Emitted once per freshly completed order, after the status flip. The receipt email hook subscribes to this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
    pub order: Order,
    pub items: Vec<FulfilledItem>,
    /// Display name of the buyer, or the receipt email for guest checkouts.
    pub buyer_name: String,
}

impl OrderCompletedEvent {
    pub fn new(order: Order, items: Vec<FulfilledItem>, buyer_name: String) -> Self {
        Self { order, items, buyer_name }
    }
}

/// Emitted once per seller with items on a freshly completed order. The sale email hook subscribes to this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerSaleEvent {
    pub order_id: OrderId,
    pub seller: Profile,
    pub payout: SellerPayout,
    pub buyer_name: String,
}
