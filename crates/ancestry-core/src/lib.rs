//! Core types and trait definitions for the statistics history store.
//!
//! This crate has no database or file-format dependencies.
//! The storage backend, the export adapter and the CLI all build on the
//! records, filters and the [`store::StatsStore`] trait defined here.

pub mod error;
pub mod filter;
pub mod history;
pub mod input;
pub mod record;
pub mod store;
pub mod table;

pub use error::{Error, Result};
