//! SQLite backend for the statistics history store.
//!
//! Every operation opens its own connection through [`tokio_rusqlite`], so
//! database work runs off the async runtime and the file handle is released
//! before the call returns.

mod connection;
mod encode;
mod query;
mod schema;
mod store;
mod write;

pub mod config;
pub mod error;

pub use config::StoreConfig;
pub use error::{Error, ErrorKind, Result};
pub use schema::SCHEMA_VERSION;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
