//! Core types and configuration for the daily offering system.
//!
//! This crate provides shared types used across all other crates:
//! - Time slot algebra (`TimeSlot`) with DST-aware day splitting
//! - Offering records, slot lengths and the store interface
//! - Sale rules
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod rules;
pub mod store;
pub mod time_slot;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{atomically, validate_entry, OfferingStore};
pub use time_slot::TimeSlot;
pub use types::*;
