//! In-memory offering store.
//!
//! Transactions snapshot the tables on `begin` and restore them on
//! `rollback`.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use offering_core::{
    validate_entry, DailyOffering, DailyOfferingEntry, Error, OfferingStore, RecordId, Result,
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
struct Tables {
    offerings: Vec<DailyOffering>,
    entries: Vec<DailyOfferingEntry>,
    next_offering_id: RecordId,
    next_entry_id: RecordId,
}

/// Offering store kept in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    timezone: Tz,
    tables: Tables,
    /// Tables as they were when the open transaction began.
    snapshot: Option<Tables>,
}

impl MemoryStore {
    /// Create an empty store validating entries in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            tables: Tables::default(),
            snapshot: None,
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }
}

impl OfferingStore for MemoryStore {
    fn get_or_create(&mut self, position_name: &str, date: NaiveDate) -> Result<DailyOffering> {
        if let Some(existing) = self
            .tables
            .offerings
            .iter()
            .find(|o| o.position_name == position_name && o.date == date)
        {
            return Ok(existing.clone());
        }

        self.tables.next_offering_id += 1;
        let offering = DailyOffering {
            id: self.tables.next_offering_id,
            position_name: position_name.to_string(),
            date,
        };
        debug!(id = offering.id, %offering, "created daily offering");
        self.tables.offerings.push(offering.clone());
        Ok(offering)
    }

    fn append_entry(
        &mut self,
        offering: &DailyOffering,
        slot_length_seconds: i64,
        values: &[String],
    ) -> Result<DailyOfferingEntry> {
        let slot_length = validate_entry(offering.date, self.timezone, slot_length_seconds, values)?;
        if !self.tables.offerings.iter().any(|o| o.id == offering.id) {
            return Err(Error::database(format!("unknown offering id {}", offering.id)));
        }

        self.tables.next_entry_id += 1;
        let entry = DailyOfferingEntry {
            id: self.tables.next_entry_id,
            offering_id: offering.id,
            slot_length,
            values: values.to_vec(),
            created_at: Utc::now(),
        };
        self.tables.entries.push(entry.clone());
        Ok(entry)
    }

    fn offerings(&self) -> Result<Vec<DailyOffering>> {
        let mut offerings = self.tables.offerings.clone();
        offerings.sort_by_key(|o| (o.date, o.id));
        Ok(offerings)
    }

    fn entries(&self, offering_id: RecordId) -> Result<Vec<DailyOfferingEntry>> {
        Ok(self
            .tables
            .entries
            .iter()
            .filter(|e| e.offering_id == offering_id)
            .cloned()
            .collect())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(Error::database("transaction already open"));
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| Error::database("no open transaction"))
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| Error::database("no open transaction"))?;
        self.tables = snapshot;
        Ok(())
    }
}
