use anyhow::Result;
use banolite_engine::db_types::OrderId;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;

mod checkout;
mod client;
mod poller;

use checkout::{run_checkout, CheckoutParams};
use client::BanoliteClient;

#[derive(Parser, Debug)]
#[command(version, about = "Command line client for the Banolite marketplace")]
pub struct Arguments {
    /// The Banolite server to talk to
    #[arg(short, long, default_value = "http://localhost:8360", env = "BNL_SERVER")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Buy a product: review the cart, create the order and watch the payment clear
    #[clap(name = "checkout")]
    Checkout(CheckoutArgs),
    /// Print the current status of an order
    #[clap(name = "status")]
    Status {
        /// The order id, as printed at checkout
        order_id: String,
    },
    /// Check that the server is up
    #[clap(name = "health")]
    Health,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// The id of the product to buy
    #[arg(short, long)]
    product: String,
    #[arg(short, long, default_value = "1")]
    quantity: i64,
    /// Receipt email. Prompted for when omitted.
    #[arg(short, long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let client = BanoliteClient::new(&args.server)?;
    match args.command {
        Command::Checkout(params) => {
            let params =
                CheckoutParams { product_id: params.product, quantity: params.quantity, email: params.email };
            run_checkout(&client, params).await?;
        },
        Command::Status { order_id } => {
            let summary = client.order_status(&OrderId(order_id)).await?;
            println!("Order {} is {} (created {})", summary.id, summary.status, summary.created_at);
        },
        Command::Health => {
            let response = client.health().await?;
            print!("{response}");
        },
    }
    Ok(())
}
