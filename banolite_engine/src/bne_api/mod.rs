//! # Banolite engine public API
//!
//! The `bne_api` module exposes the programmatic API for the Banolite fulfillment engine.
//! The API is modular, so that clients of the API can pick and choose the functionality they want.
//!
//! * [`accounts_api`] provides methods for interacting with profiles, wallets and notifications.
//! * [`auth_api`] resolves bearer tokens to profiles and issues tokens for tools and tests.
//! * [`catalog_api`] manages the product catalog.
//! * [`fulfillment_api`] is the primary API for the order and payment flow, from pending order creation to the
//!   processing of charge events from the payment provider.
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
pub mod accounts_api;
pub mod auth_api;
pub mod catalog_api;
pub mod fulfillment_api;
pub mod order_objects;
