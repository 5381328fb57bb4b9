//! Offering ingestion for the daily offering system.
//!
//! This crate handles:
//! - Splitting a multi-day value list into per-day buckets (DST-aware)
//! - Handing buckets to the offering store
//! - Submission payload parsing and validation
//! - All-or-nothing processing of a whole submission

pub mod bucketer;
pub mod submission;

pub use bucketer::DayBucketer;
pub use submission::{parse_payload, OfferingPayloadItem, SubmissionProcessor, UploadReport};
