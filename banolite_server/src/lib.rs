//! # Banolite server
//! This module hosts the HTTP server for the Banolite marketplace. It is responsible for:
//! Listening for incoming webhook calls from the payment provider.
//! Verifying their HMAC signatures and handing the charge events to the fulfillment engine.
//! Serving the storefront API: orders, products, profiles, notifications, uploads and the AI chat relay.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/payment`: The webhook route for receiving charge events from the payment provider.
//! * `/order/{id}`: The order status route that checkout clients poll.
//! * `/products`: The public product catalog.
//! * `/api/...`: The authenticated storefront API.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod webhook_routes;

#[cfg(test)]
mod endpoint_tests;
