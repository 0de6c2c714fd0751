//! Banolite Fulfillment Engine
//!
//! The Banolite engine contains the core logic for the marketplace's order and payment flow. It is
//! provider-agnostic: the server feeds it verified charge events and it takes care of the rest.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The exception is the data types used in the database.
//!    These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`mod@bne_api`]). This provides the public-facing functionality of the engine. It is
//!    responsible for managing orders, fulfillment, the catalog, profiles and authentication. Specific backends
//!    need to implement the traits in the [`mod@traits`] module in order to act as a backend for the Banolite
//!    server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when fulfillment
//! actions occur, for example when an order is completed an `OrderCompletedEvent` is emitted. A simple actor
//! framework is used so that you can easily hook into these events and perform custom actions, such as sending
//! emails.
mod bne_api;

pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use bne_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    catalog_api::CatalogApi,
    fulfillment_api::{FulfillmentApi, DEFAULT_FEE_BPS},
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
