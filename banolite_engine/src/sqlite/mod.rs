//! SQLite database module for the Banolite fulfillment engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
