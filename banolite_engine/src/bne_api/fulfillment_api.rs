use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewNotification, NewOrder, NotificationKind, Order, OrderId, OrderItem, ProductType},
    events::{EventProducers, OrderCompletedEvent, SellerSaleEvent},
    order_objects::{
        FulfilledItem,
        FulfillmentOutcome,
        FulfillmentReceipt,
        OrderStatusSummary,
        OrderWithItems,
        SellerPayout,
    },
    traits::{FulfillmentDatabase, FulfillmentError},
};

/// The default platform fee, in basis points.
pub const DEFAULT_FEE_BPS: i64 = 500;

/// `FulfillmentApi` is the primary API for the order and payment flow. It creates pending orders at checkout and
/// turns charge events from the payment provider into completed, fulfilled orders.
pub struct FulfillmentApi<B> {
    db: B,
    producers: EventProducers,
    fee_bps: i64,
}

impl<B> Debug for FulfillmentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B> FulfillmentApi<B> {
    pub fn new(db: B, producers: EventProducers, fee_bps: i64) -> Self {
        Self { db, producers, fee_bps }
    }
}

impl<B> FulfillmentApi<B>
where B: FulfillmentDatabase
{
    /// Creates a pending order from a checkout cart snapshot. This is the only place orders are created. The
    /// returned order's id doubles as the payment reference handed to the payment widget.
    pub async fn create_pending_order(&self, order: NewOrder) -> Result<Order, FulfillmentError> {
        order.validate()?;
        self.check_product_requirements(&order).await?;
        let order = self.db.insert_order(order).await?;
        info!("🔄️📦️ Pending order {} created for [{}], total {}", order.id, order.user_id, order.total);
        Ok(order)
    }

    /// Coaching sessions need a booking date and tickets need an attendee name. The storefront collects these at
    /// checkout, but clients are not trusted to enforce it.
    async fn check_product_requirements(&self, order: &NewOrder) -> Result<(), FulfillmentError> {
        for item in &order.items {
            let Some(product) = self.db.fetch_product(&item.product_id).await? else {
                continue;
            };
            match product.product_type {
                ProductType::Coaching if order.booking_date.is_none() => {
                    return Err(FulfillmentError::InvalidOrder(format!(
                        "A booking date is required for {}",
                        product.title
                    )));
                },
                ProductType::Ticket if order.attendee_name.is_none() => {
                    return Err(FulfillmentError::InvalidOrder(format!(
                        "An attendee name is required for {}",
                        product.title
                    )));
                },
                _ => {},
            }
        }
        Ok(())
    }

    /// The status summary the checkout client polls for.
    pub async fn order_status(&self, order_id: &OrderId) -> Result<OrderStatusSummary, FulfillmentError> {
        let order = self
            .db
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        Ok(order.into())
    }

    /// A buyer's order history, newest first, with line items.
    pub async fn order_history(&self, user_id: &str) -> Result<Vec<OrderWithItems>, FulfillmentError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(&order.id).await?;
            result.push(OrderWithItems { order, items });
        }
        Ok(result)
    }

    /// Processes a verified charge event from the payment provider.
    ///
    /// The only must-succeed step is the atomic `Pending` → `Completed` status flip. Everything after it is a
    /// best-effort secondary effect: a failing effect is logged and skipped, and a failure in one seller's payout
    /// never blocks another seller's. Duplicate deliveries lose the conditional update and come back as
    /// [`FulfillmentOutcome::AlreadyProcessed`] with no effects re-applied.
    pub async fn process_charge_event(
        &self,
        event: crate::order_objects::ChargeEvent,
    ) -> Result<FulfillmentOutcome, FulfillmentError> {
        if !event.is_success() {
            debug!("🔄️🛍️ Ignoring webhook event type [{}]", event.event);
            return Ok(FulfillmentOutcome::Ignored(event.event));
        }
        let order_id = OrderId::from(event.data.reference);
        let order =
            self.db.fetch_order(&order_id).await?.ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        let Some(completed) = self.db.mark_order_completed(&order_id).await? else {
            info!("🔄️🛍️ Charge event for order {order_id} arrived but the order is already {}. Nothing to do.", order.status);
            return Ok(FulfillmentOutcome::AlreadyProcessed(order));
        };
        info!("🔄️🛍️ Order {order_id} confirmed as paid. Applying fulfillment effects.");
        let receipt = self.apply_fulfillment_effects(completed).await;
        Ok(FulfillmentOutcome::Completed(Box::new(receipt)))
    }

    async fn apply_fulfillment_effects(&self, order: Order) -> FulfillmentReceipt {
        let items = match self.db.fetch_order_items(&order.id).await {
            Ok(items) => items,
            Err(e) => {
                error!("🔄️🛍️ Could not load the items for order {}: {e}. Skipping fulfillment effects.", order.id);
                Vec::new()
            },
        };
        let fulfilled = self.bump_sales_counts(&order, &items).await;
        let buyer_name = self.apply_buyer_effects(&order, &items).await;
        self.call_order_completed_hook(&order, &fulfilled, &buyer_name).await;
        let payouts = self.pay_sellers(&order, &fulfilled, &buyer_name).await;
        let items = fulfilled.into_iter().map(|(item, _)| item).collect();
        FulfillmentReceipt { order, items, payouts }
    }

    /// Resolves each line's product and bumps its sales count. Lines whose product no longer exists are logged and
    /// dropped from the fulfilled set, so they contribute to neither sales counts nor payouts.
    async fn bump_sales_counts(&self, order: &Order, items: &[OrderItem]) -> Vec<(FulfilledItem, String)> {
        let mut fulfilled = Vec::with_capacity(items.len());
        for item in items {
            let product = match self.db.fetch_product(&item.product_id).await {
                Ok(Some(p)) => p,
                Ok(None) => {
                    warn!(
                        "🔄️🛍️ Product [{}] on order {} no longer exists. Skipping the line.",
                        item.product_id, order.id
                    );
                    continue;
                },
                Err(e) => {
                    error!("🔄️🛍️ Could not load product [{}] for order {}: {e}. Skipping the line.", item.product_id, order.id);
                    continue;
                },
            };
            if let Err(e) = self.db.record_sales(&product.id, item.quantity).await {
                warn!("🔄️🛍️ Could not bump the sales count for [{}]: {e}", product.id);
            }
            let line = FulfilledItem {
                product_id: product.id,
                title: product.title,
                price: item.price,
                quantity: item.quantity,
            };
            fulfilled.push((line, product.creator_id));
        }
        fulfilled
    }

    /// Grants the buyer access to their purchases and leaves them a notification. Returns the buyer's display name
    /// for use in events and seller notifications.
    async fn apply_buyer_effects(&self, order: &Order, items: &[OrderItem]) -> String {
        let mut buyer_name = order.email.clone();
        if order.is_guest() {
            return buyer_name;
        }
        let product_ids = items.iter().map(|i| i.product_id.clone()).collect::<Vec<_>>();
        if let Err(e) = self.db.add_purchased_products(&order.user_id, &product_ids).await {
            warn!("🔄️🛍️ Could not record purchases for [{}] on order {}: {e}", order.user_id, order.id);
        }
        match self.db.fetch_profile(&order.user_id).await {
            Ok(Some(profile)) => buyer_name = profile.name,
            Ok(None) => warn!("🔄️🛍️ No profile found for buyer [{}] on order {}", order.user_id, order.id),
            Err(e) => warn!("🔄️🛍️ Could not load the buyer profile for order {}: {e}", order.id),
        }
        let notification =
            NewNotification::new(&order.user_id, NotificationKind::Order, format!("Your order {} is complete. Your purchases are ready.", order.id))
                .with_link(format!("/orders/{}", order.id.as_str()));
        if let Err(e) = self.db.insert_notification(notification).await {
            warn!("🔄️🛍️ Could not notify the buyer for order {}: {e}", order.id);
        }
        buyer_name
    }

    /// Groups the fulfilled lines by creator and credits each seller's wallet with the net proceeds. Each seller is
    /// handled independently.
    async fn pay_sellers(
        &self,
        order: &Order,
        fulfilled: &[(FulfilledItem, String)],
        buyer_name: &str,
    ) -> Vec<SellerPayout> {
        let mut payouts: Vec<SellerPayout> = Vec::new();
        for (item, seller_id) in fulfilled {
            match payouts.iter_mut().find(|p| &p.seller_id == seller_id) {
                Some(payout) => {
                    payout.gross += item.price * item.quantity;
                    payout.item_count += item.quantity;
                    payout.product_titles.push(item.title.clone());
                },
                None => payouts.push(SellerPayout {
                    seller_id: seller_id.clone(),
                    gross: item.price * item.quantity,
                    fee: Default::default(),
                    net: Default::default(),
                    item_count: item.quantity,
                    product_titles: vec![item.title.clone()],
                }),
            }
        }
        for payout in &mut payouts {
            let (net, fee) = payout.gross.less_fee(self.fee_bps);
            payout.net = net;
            payout.fee = fee;
            if let Err(e) = self.db.credit_wallet(&payout.seller_id, payout.net).await {
                error!(
                    "🔄️🛍️ Could not credit {} to seller [{}] for order {}: {e}. Skipping the rest of this seller's \
                     effects.",
                    payout.net, payout.seller_id, order.id
                );
                continue;
            }
            let titles = payout.product_titles.join(", ");
            let notification = NewNotification::new(
                &payout.seller_id,
                NotificationKind::Sale,
                format!("{buyer_name} bought {titles}. {} was credited to your wallet.", payout.net),
            )
            .with_link("/dashboard/sales");
            if let Err(e) = self.db.insert_notification(notification).await {
                warn!("🔄️🛍️ Could not notify seller [{}] for order {}: {e}", payout.seller_id, order.id);
            }
            self.call_seller_sale_hook(order, payout, buyer_name).await;
        }
        payouts
    }

    async fn call_order_completed_hook(&self, order: &Order, fulfilled: &[(FulfilledItem, String)], buyer_name: &str) {
        let items = fulfilled.iter().map(|(item, _)| item.clone()).collect::<Vec<_>>();
        for emitter in &self.producers.order_completed_producer {
            debug!("🔄️📦️ Notifying order completed hook subscribers");
            let event = OrderCompletedEvent::new(order.clone(), items.clone(), buyer_name.to_string());
            emitter.publish_event(event).await;
        }
    }

    async fn call_seller_sale_hook(&self, order: &Order, payout: &SellerPayout, buyer_name: &str) {
        if self.producers.seller_sale_producer.is_empty() {
            return;
        }
        let seller = match self.db.fetch_profile(&payout.seller_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!("🔄️🛍️ No profile found for seller [{}]. Not emitting a sale event.", payout.seller_id);
                return;
            },
            Err(e) => {
                warn!("🔄️🛍️ Could not load the profile for seller [{}]: {e}. Not emitting a sale event.", payout.seller_id);
                return;
            },
        };
        for emitter in &self.producers.seller_sale_producer {
            debug!("🔄️📦️ Notifying seller sale hook subscribers");
            let event = SellerSaleEvent {
                order_id: order.id.clone(),
                seller: seller.clone(),
                payout: payout.clone(),
                buyer_name: buyer_name.to_string(),
            };
            emitter.publish_event(event).await;
        }
    }
}
