//! The interactive checkout flow: review the cart, create the pending order, then watch it while the payment
//! clears. The CLI plays the part of the storefront's payment widget, so "opening the widget" here is a prompt.
use anyhow::Result;
use banolite_engine::db_types::{OrderStatusType, ProductType};
use banolite_server::data_objects::{CartItem, NewOrderRequest};
use bnl_common::Money;
use dialoguer::{Confirm, Input};
use log::warn;

use crate::{
    client::BanoliteClient,
    poller::{cancel_pair, poll_until, PollOutcome, MAX_POLL_ATTEMPTS, POLL_INTERVAL},
};

pub struct CheckoutParams {
    pub product_id: String,
    pub quantity: i64,
    pub email: Option<String>,
}

pub async fn run_checkout(client: &BanoliteClient, params: CheckoutParams) -> Result<()> {
    // Review step
    let product = client.product(&params.product_id).await?;
    let quantity = params.quantity.max(1);
    let total = product.price * quantity;
    println!("Order review");
    println!("  {} x {} @ {} = {}", quantity, product.title, product.price, total);
    let email = match params.email {
        Some(email) => email,
        None => Input::new().with_prompt("Receipt email").interact_text()?,
    };
    let mut booking_date = None;
    let mut attendee_name = None;
    match product.product_type {
        ProductType::Coaching => {
            let date: String = Input::new().with_prompt("Preferred booking date").interact_text()?;
            println!("  Your coach will confirm {date} by email.");
            booking_date = Some(date);
        },
        ProductType::Ticket => {
            let attendee: String = Input::new().with_prompt("Attendee name").interact_text()?;
            println!("  The ticket will be issued to {attendee}.");
            attendee_name = Some(attendee);
        },
        _ => {},
    }
    if !Confirm::new().with_prompt("Proceed to payment?").default(true).interact()? {
        println!("Checkout abandoned.");
        return Ok(());
    }

    // Payment step. The order id doubles as the payment reference.
    let item = CartItem { product_id: product.id.clone(), price: product.price, quantity };
    let request = NewOrderRequest { email, total, booking_date, attendee_name, items: vec![item] };
    let order = client.create_order(&request).await?;
    println!("Pending order created. Payment reference: {}", order.order_id);
    if !Confirm::new().with_prompt("Open the payment widget and complete the payment. Ready?").default(true).interact()?
    {
        println!("Widget closed. The pending order was abandoned and will not be charged.");
        return Ok(());
    }

    watch_order(client, order.order_id.as_str(), order.total).await
}

/// Polls the order until it completes, times out, or the user presses ctrl-c.
pub async fn watch_order(client: &BanoliteClient, order_id: &str, total: Money) -> Result<()> {
    let order_id = banolite_engine::db_types::OrderId::from(order_id.to_string());
    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    println!("Waiting for the payment to clear (ctrl-c to stop watching)...");
    let poll_id = order_id.clone();
    let outcome = poll_until(POLL_INTERVAL, MAX_POLL_ATTEMPTS, token, move |attempt| {
        let order_id = poll_id.clone();
        async move {
            match client.order_status(&order_id).await {
                Ok(summary) if summary.status.is_terminal() => Some(summary),
                Ok(_) => None,
                Err(e) => {
                    warn!("⏱️ Status check {attempt} failed: {e}");
                    None
                },
            }
        }
    })
    .await;
    match outcome {
        PollOutcome::Confirmed(summary) => match summary.status {
            OrderStatusType::Completed => {
                println!("🎉 Payment of {total} confirmed. Order {} is complete.", summary.id);
                println!("Your receipt and download links are on their way by email.");
            },
            status => println!("Order {} finished as {status}. No charge was applied.", summary.id),
        },
        PollOutcome::TimedOut => {
            println!("The payment is still being verified. You will receive your receipt by email once it clears.");
        },
        PollOutcome::Cancelled => {
            println!("Stopped watching order {order_id}. It will still complete once the payment clears.");
        },
    }
    Ok(())
}
