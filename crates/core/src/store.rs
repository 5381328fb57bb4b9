//! Persistence interface for daily offerings.
//!
//! Implementations live in the `offering-store` crate. Every implementation
//! validates appended entries through [`validate_entry`] so that the
//! per-day slot count is enforced no matter which code path writes.

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::time_slot::TimeSlot;
use crate::types::{DailyOffering, DailyOfferingEntry, RecordId, SlotLength};

/// Store keyed by (position name, date).
pub trait OfferingStore {
    /// Fetch the record for `(position_name, date)`, creating it if missing.
    fn get_or_create(&mut self, position_name: &str, date: NaiveDate) -> Result<DailyOffering>;

    /// Append a value list to `offering`.
    ///
    /// Fails with `UnrecognizedSlotLength` or `CountMismatch` before writing.
    fn append_entry(
        &mut self,
        offering: &DailyOffering,
        slot_length_seconds: i64,
        values: &[String],
    ) -> Result<DailyOfferingEntry>;

    /// All records, ordered by date.
    fn offerings(&self) -> Result<Vec<DailyOffering>>;

    /// Entries of one record in insertion order.
    fn entries(&self, offering_id: RecordId) -> Result<Vec<DailyOfferingEntry>>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;
}

/// Check an entry against the slot count of its day in `tz`.
pub fn validate_entry(
    date: NaiveDate,
    tz: Tz,
    slot_length_seconds: i64,
    values: &[String],
) -> Result<SlotLength> {
    let slot_length = SlotLength::try_from(slot_length_seconds)?;
    let expected = TimeSlot::at_date(date, tz, None)?
        .split(slot_length.duration())?
        .len();
    if expected != values.len() {
        return Err(Error::CountMismatch {
            expected,
            actual: values.len(),
        });
    }
    Ok(slot_length)
}

/// Run `f` inside a store transaction.
///
/// Commits when `f` succeeds; rolls back and returns the original error
/// otherwise.
pub fn atomically<S, T, F>(store: &mut S, f: F) -> Result<T>
where
    S: OfferingStore + ?Sized,
    F: FnOnce(&mut S) -> Result<T>,
{
    store.begin()?;
    match f(&mut *store) {
        Ok(value) => {
            store.commit()?;
            Ok(value)
        }
        Err(err) => {
            // A failed rollback is dropped in favour of `err`.
            let _ = store.rollback();
            Err(err)
        }
    }
}
