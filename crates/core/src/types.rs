//! Core data types for the daily offering system.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Database row identifier.
pub type RecordId = i64;

/// Nominal slot length accepted for offering entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i64)]
pub enum SlotLength {
    /// One hour.
    Hour = 3600,
    /// Quarter slot as configured by the market (1900 s).
    Quarter = 1900,
}

impl SlotLength {
    /// Every accepted slot length.
    pub const ALL: [SlotLength; 2] = [SlotLength::Hour, SlotLength::Quarter];

    /// Length in seconds.
    #[inline]
    pub fn seconds(self) -> i64 {
        self as i64
    }

    /// Length as a time span.
    #[inline]
    pub fn duration(self) -> TimeDelta {
        TimeDelta::seconds(self.seconds())
    }
}

impl TryFrom<i64> for SlotLength {
    type Error = Error;

    fn try_from(seconds: i64) -> Result<Self, Self::Error> {
        SlotLength::ALL
            .into_iter()
            .find(|len| len.seconds() == seconds)
            .ok_or(Error::UnrecognizedSlotLength(seconds))
    }
}

impl From<SlotLength> for i64 {
    fn from(len: SlotLength) -> Self {
        len.seconds()
    }
}

impl fmt::Display for SlotLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.seconds())
    }
}

/// One calendar day's worth of values cut from a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Civil date in the trading timezone.
    pub date: NaiveDate,
    /// Values for every slot of that day, in slot order.
    pub values: Vec<String>,
}

/// Stored offering record for one position on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOffering {
    pub id: RecordId,
    pub position_name: String,
    pub date: NaiveDate,
}

impl fmt::Display for DailyOffering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.date, self.position_name)
    }
}

/// A value list appended to a [`DailyOffering`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOfferingEntry {
    pub id: RecordId,
    pub offering_id: RecordId,
    pub slot_length: SlotLength,
    pub values: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for DailyOfferingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DailyOfferingEntry('{}')",
            self.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
