//! Per-day bucketing of offering submissions.
//!
//! A submission carries a start instant and a flat list of values, one per
//! nominal slot. The bucketer walks forward one civil day at a time in the
//! trading timezone, asks the day's [`TimeSlot`] how many slots it holds
//! (23, 24 or 25 for hourly slots in DST zones) and cuts that many values.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone};
use chrono_tz::Tz;
use offering_core::time_slot::start_of_day;
use offering_core::{Bucket, Error, OfferingStore, Result, SlotLength, TimeSlot};
use tracing::debug;

/// Splits value lists into calendar-day buckets of one trading timezone.
#[derive(Debug, Clone, Copy)]
pub struct DayBucketer {
    timezone: Tz,
}

impl DayBucketer {
    /// Create a bucketer for the given trading timezone.
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Number of `step` slots in the civil day `date`.
    pub fn slots_in_day(&self, date: NaiveDate, step: TimeDelta) -> Result<usize> {
        Ok(TimeSlot::at_date(date, self.timezone, None)?.split(step)?.len())
    }

    /// Cut `values` into one bucket per civil day, starting on the day of
    /// `start`.
    ///
    /// Every bucket holds exactly the slot count of its day. Fails with
    /// `InsufficientData` if the values run out partway through a day.
    pub fn bucketize<Z: TimeZone>(
        &self,
        start: &DateTime<Z>,
        step: TimeDelta,
        values: &[String],
    ) -> Result<Vec<Bucket>> {
        let mut buckets = Vec::new();
        let mut cursor = start.with_timezone(&self.timezone);
        let mut consumed = 0;

        while consumed < values.len() {
            let date = cursor.date_naive();
            let slots = self.slots_in_day(date, step)?;
            let available = values.len() - consumed;
            if available < slots {
                return Err(Error::insufficient_data(date, slots, available));
            }

            debug!(%date, slots, "cut day bucket");
            buckets.push(Bucket {
                date,
                values: values[consumed..consumed + slots].to_vec(),
            });
            consumed += slots;

            let next_day = date
                .succ_opt()
                .ok_or_else(|| Error::invalid_argument(format!("no day follows {date}")))?;
            cursor = start_of_day(next_day, self.timezone);
        }

        Ok(buckets)
    }

    /// Bucket one position's values and append every bucket to `store`.
    ///
    /// Returns the dates written. The caller owns the transaction; a failure
    /// here leaves earlier buckets of the same call written until rolled
    /// back.
    pub fn ingest<S, Z>(
        &self,
        store: &mut S,
        position_name: &str,
        start: &DateTime<Z>,
        slot_length: SlotLength,
        values: &[String],
    ) -> Result<BTreeSet<NaiveDate>>
    where
        S: OfferingStore + ?Sized,
        Z: TimeZone,
    {
        let buckets = self.bucketize(start, slot_length.duration(), values)?;
        let mut dates = BTreeSet::new();

        for bucket in buckets {
            let offering = store.get_or_create(position_name, bucket.date)?;
            let entry = store.append_entry(&offering, slot_length.seconds(), &bucket.values)?;
            debug!(
                position = position_name,
                date = %bucket.date,
                entry_id = entry.id,
                values = bucket.values.len(),
                "appended offering entry"
            );
            dates.insert(bucket.date);
        }

        Ok(dates)
    }
}
