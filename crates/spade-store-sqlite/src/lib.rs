//! SQLite backend for the Spade session store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every mutating operation runs inside a
//! single `IMMEDIATE` transaction, ownership check included.

mod encode;
mod schema;
mod seed;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use seed::STARTER_ACTIONS;
pub use store::SqliteStore;
