//! SQLite backend for the Plaza entity store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every call runs to completion on that
//! thread before the next one starts, and each mutation is a single
//! transaction, so invariant checks and writes can never interleave.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
