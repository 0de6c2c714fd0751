//! Database types for the Banolite order fulfillment engine.
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use bnl_common::Money;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// Orders placed without an authenticated account carry this user id.
pub const GUEST_USER_ID: &str = "guest";

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been created and no charge has been confirmed yet.
    Pending,
    /// The charge succeeded and fulfillment side effects have run.
    Completed,
    /// The payment provider reported a failed charge.
    Failed,
    /// The order was refunded after completion.
    Refunded,
}

impl OrderStatusType {
    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Failed | OrderStatusType::Refunded)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Failed => write!(f, "Failed"),
            OrderStatusType::Refunded => write!(f, "Refunded"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// A fresh random order id. This doubles as the payment reference sent to the payment provider.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: String,
    pub email: String,
    pub total: Money,
    pub status: OrderStatusType,
    /// Tag identifying how the buyer paid, e.g. `card`.
    pub payment_method: String,
    /// The reference handed to the payment provider. The order id by default, so webhook events map back without a
    /// lookup table.
    pub payment_ref: Option<String>,
    /// Required when the cart contains a coaching session.
    pub booking_date: Option<String>,
    /// Required when the cart contains a ticket.
    pub attendee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_guest(&self) -> bool {
        self.user_id == GUEST_USER_ID
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// The buyer's user id, or [`GUEST_USER_ID`] for guest checkouts.
    pub user_id: String,
    /// Receipt email for the order.
    pub email: String,
    /// The order total as submitted by the client.
    pub total: Money,
    /// Tag identifying how the buyer will pay.
    pub payment_method: String,
    /// Preferred date for coaching sessions in the cart.
    pub booking_date: Option<String>,
    /// Attendee name for tickets in the cart.
    pub attendee_name: Option<String>,
    /// The cart contents.
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(user_id: String, email: String, total: Money) -> Self {
        Self {
            user_id,
            email,
            total,
            payment_method: "card".to_string(),
            booking_date: None,
            attendee_name: None,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: NewOrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_payment_method<S: Into<String>>(mut self, method: S) -> Self {
        self.payment_method = method.into();
        self
    }

    pub fn with_booking_date<S: Into<String>>(mut self, date: S) -> Self {
        self.booking_date = Some(date.into());
        self
    }

    pub fn with_attendee_name<S: Into<String>>(mut self, name: S) -> Self {
        self.attendee_name = Some(name.into());
        self
    }

    /// Basic sanity checks before an order hits the database.
    pub fn validate(&self) -> Result<(), ConversionError> {
        if self.items.is_empty() {
            return Err(ConversionError("An order must contain at least one item".into()));
        }
        if self.total <= Money::default() {
            return Err(ConversionError(format!("Order total must be positive, got {}", self.total)));
        }
        if self.email.trim().is_empty() {
            return Err(ConversionError("An order must carry a receipt email".into()));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity <= 0) {
            return Err(ConversionError(format!("Invalid quantity {} for product {}", item.quantity, item.product_id)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    /// Unit price at the time of checkout.
    pub price: Money,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(product_id: S, price: Money, quantity: i64) -> Self {
        Self { product_id: product_id.into(), price, quantity }
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: String,
    pub price: Money,
    pub quantity: i64,
}

impl OrderItem {
    /// Line subtotal, price times quantity.
    pub fn subtotal(&self) -> Money {
        self.price * self.quantity
    }
}

//--------------------------------------      ProductType      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ProductType {
    Ebook,
    Course,
    Ticket,
    Service,
    Coaching,
}

impl Display for ProductType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Ebook => write!(f, "Ebook"),
            ProductType::Course => write!(f, "Course"),
            ProductType::Ticket => write!(f, "Ticket"),
            ProductType::Service => write!(f, "Service"),
            ProductType::Coaching => write!(f, "Coaching"),
        }
    }
}

impl FromStr for ProductType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ebook" => Ok(Self::Ebook),
            "Course" => Ok(Self::Course),
            "Ticket" => Ok(Self::Ticket),
            "Service" => Ok(Self::Service),
            "Coaching" => Ok(Self::Coaching),
            s => Err(ConversionError(format!("Invalid product type: {s}"))),
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid product type: {value}. But this conversion cannot fail. Defaulting to Ebook");
            ProductType::Ebook
        })
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub product_type: ProductType,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub price: Money,
    pub product_type: ProductType,
    pub cover_url: Option<String>,
    pub file_url: Option<String>,
}

//--------------------------------------          Role         ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "Buyer"),
            Role::Seller => write!(f, "Seller"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid role: {value}. But this conversion cannot fail. Defaulting to Buyer");
            Role::Buyer
        })
    }
}

//--------------------------------------        Profile        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub wallet_balance: Money,
    /// Product ids this user has bought. Stored as a JSON array in the database.
    pub purchased_product_ids: Vec<String>,
    /// Storefront display name for sellers.
    pub store_name: Option<String>,
    /// Storefront blurb for sellers.
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub store_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.store_name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}

//--------------------------------------      Notification     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A buyer-facing order confirmation.
    Order,
    /// A seller-facing sale alert.
    Sale,
    /// Anything the platform wants to tell a user.
    System,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Order => write!(f, "Order"),
            NotificationKind::Sale => write!(f, "Sale"),
            NotificationKind::System => write!(f, "System"),
        }
    }
}

impl FromStr for NotificationKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Order" => Ok(Self::Order),
            "Sale" => Ok(Self::Sale),
            "System" => Ok(Self::System),
            s => Err(ConversionError(format!("Invalid notification kind: {s}"))),
        }
    }
}

impl From<String> for NotificationKind {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid notification kind: {value}. But this conversion cannot fail. Defaulting to System");
            NotificationKind::System
        })
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new<S1: Into<String>, S2: Into<String>>(user_id: S1, kind: NotificationKind, message: S2) -> Self {
        Self { user_id: user_id.into(), kind, message: message.into(), link: None }
    }

    pub fn with_link<S: Into<String>>(mut self, link: S) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn order_status_round_trip() {
        for status in
            [OrderStatusType::Pending, OrderStatusType::Completed, OrderStatusType::Failed, OrderStatusType::Refunded]
        {
            let s = status.to_string();
            assert_eq!(OrderStatusType::from_str(&s).unwrap(), status);
        }
        assert!(OrderStatusType::from_str("Paid").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatusType::Pending.is_terminal());
        assert!(OrderStatusType::Completed.is_terminal());
        assert!(OrderStatusType::Failed.is_terminal());
        assert!(OrderStatusType::Refunded.is_terminal());
    }

    #[test]
    fn new_order_validation() {
        let empty = NewOrder::new("alice".into(), "alice@example.com".into(), Money::from_cents(1000));
        assert!(empty.validate().is_err());
        let ok = empty.clone().with_item(NewOrderItem::new("p1", Money::from_cents(500), 2));
        assert!(ok.validate().is_ok());
        let bad_qty = empty.with_item(NewOrderItem::new("p1", Money::from_cents(500), 0));
        assert!(bad_qty.validate().is_err());
    }

    #[test]
    fn order_ids_are_unique() {
        assert_ne!(OrderId::random(), OrderId::random());
    }
}
