//! The traits that a backend must implement to be used by the Banolite server.
//!
//! Every seam between the API layer and the storage layer is a trait, so that the endpoint tests can run against
//! mocks and the server against SQLite without either knowing about the other.
mod account_management;
mod auth_management;
mod catalog_management;
mod fulfillment_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use auth_management::{AuthApiError, AuthManagement};
pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use fulfillment_database::{FulfillmentDatabase, FulfillmentError};
