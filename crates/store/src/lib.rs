//! Offering stores for the daily offering system.
//!
//! This crate provides:
//! - An in-memory store with snapshot-based transactions
//! - A SQLite store backed by `rusqlite`
//!
//! Both implement `offering_core::OfferingStore` and validate every entry
//! against the slot count of its day before writing.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
