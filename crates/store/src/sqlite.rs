//! SQLite offering store.
//!
//! Dates are stored as `YYYY-MM-DD` text, entry values as a JSON array and
//! creation times as RFC 3339 text.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use offering_core::{
    validate_entry, Config, DailyOffering, DailyOfferingEntry, Error, OfferingStore, RecordId,
    Result, SlotLength,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS daily_offering (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    position_name TEXT NOT NULL,
    date TEXT NOT NULL,
    UNIQUE (position_name, date)
);
CREATE INDEX IF NOT EXISTS daily_offering_date_idx ON daily_offering (date);
CREATE TABLE IF NOT EXISTS daily_offering_entry (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    offering_id INTEGER NOT NULL REFERENCES daily_offering (id),
    slot_length INTEGER NOT NULL,
    values_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn db_err(err: rusqlite::Error) -> Error {
    Error::database(err.to_string())
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| Error::database(format!("bad stored date {text:?}: {e}")))
}

/// Offering store backed by a SQLite database.
pub struct SqliteStore {
    conn: Connection,
    timezone: Tz,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, timezone: Tz) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err)?;
        debug!(path = %path.as_ref().display(), "opened offering database");
        Self::with_connection(conn, timezone)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(timezone: Tz) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::with_connection(conn, timezone)
    }

    /// Open the database named by `config`, or an in-memory one.
    pub fn from_config(config: &Config) -> Result<Self> {
        let timezone = config.trading_timezone()?;
        match &config.store.database_path {
            Some(path) => Self::open(path, timezone),
            None => Self::open_in_memory(timezone),
        }
    }

    fn with_connection(conn: Connection, timezone: Tz) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn, timezone })
    }

    fn find_offering(&self, position_name: &str, date: NaiveDate) -> Result<Option<DailyOffering>> {
        let id: Option<RecordId> = self
            .conn
            .query_row(
                "SELECT id FROM daily_offering WHERE position_name = ?1 AND date = ?2",
                params![position_name, date.format(DATE_FORMAT).to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(id.map(|id| DailyOffering {
            id,
            position_name: position_name.to_string(),
            date,
        }))
    }
}

impl OfferingStore for SqliteStore {
    fn get_or_create(&mut self, position_name: &str, date: NaiveDate) -> Result<DailyOffering> {
        if let Some(existing) = self.find_offering(position_name, date)? {
            return Ok(existing);
        }

        self.conn
            .execute(
                "INSERT INTO daily_offering (position_name, date) VALUES (?1, ?2)",
                params![position_name, date.format(DATE_FORMAT).to_string()],
            )
            .map_err(db_err)?;
        let offering = DailyOffering {
            id: self.conn.last_insert_rowid(),
            position_name: position_name.to_string(),
            date,
        };
        debug!(id = offering.id, %offering, "created daily offering");
        Ok(offering)
    }

    fn append_entry(
        &mut self,
        offering: &DailyOffering,
        slot_length_seconds: i64,
        values: &[String],
    ) -> Result<DailyOfferingEntry> {
        let slot_length = validate_entry(offering.date, self.timezone, slot_length_seconds, values)?;
        let created_at = Utc::now();

        self.conn
            .execute(
                "INSERT INTO daily_offering_entry (offering_id, slot_length, values_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    offering.id,
                    slot_length.seconds(),
                    serde_json::to_string(values)?,
                    created_at.to_rfc3339(),
                ],
            )
            .map_err(db_err)?;

        Ok(DailyOfferingEntry {
            id: self.conn.last_insert_rowid(),
            offering_id: offering.id,
            slot_length,
            values: values.to_vec(),
            created_at,
        })
    }

    fn offerings(&self) -> Result<Vec<DailyOffering>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, position_name, date FROM daily_offering ORDER BY date, id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, RecordId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(db_err)?;

        let mut offerings = Vec::new();
        for row in rows {
            let (id, position_name, date) = row.map_err(db_err)?;
            offerings.push(DailyOffering {
                id,
                position_name,
                date: parse_date(&date)?,
            });
        }
        Ok(offerings)
    }

    fn entries(&self, offering_id: RecordId) -> Result<Vec<DailyOfferingEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, slot_length, values_json, created_at FROM daily_offering_entry
                 WHERE offering_id = ?1 ORDER BY id",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![offering_id], |row| {
                Ok((
                    row.get::<_, RecordId>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, slot_length, values_json, created_at) = row.map_err(db_err)?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| Error::database(format!("bad stored timestamp {created_at:?}: {e}")))?
                .with_timezone(&Utc);
            entries.push(DailyOfferingEntry {
                id,
                offering_id,
                slot_length: SlotLength::try_from(slot_length)?,
                values: serde_json::from_str(&values_json)?,
                created_at,
            });
        }
        Ok(entries)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(db_err)
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT").map_err(db_err)
    }

    fn rollback(&mut self) -> Result<()> {
        debug!("rolling back offering transaction");
        self.conn.execute_batch("ROLLBACK").map_err(db_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz::CET;
    use offering_core::atomically;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn values(n: usize) -> Vec<String> {
        vec!["10.5".to_string(); n]
    }

    #[test]
    fn test_get_or_create_reuses_record() {
        let mut store = SqliteStore::open_in_memory(CET).unwrap();
        let first = store.get_or_create("Test Position", date(2024, 1, 15)).unwrap();
        let again = store.get_or_create("Test Position", date(2024, 1, 15)).unwrap();
        assert_eq!(first, again);
        assert_eq!(store.offerings().unwrap(), vec![first]);
    }

    #[test]
    fn test_entry_round_trip() {
        let mut store = SqliteStore::open_in_memory(CET).unwrap();
        let offering = store.get_or_create("Test Position", date(2024, 10, 27)).unwrap();
        let mut vals = values(25);
        vals[0] = "1.25".to_string();
        let entry = store.append_entry(&offering, 3600, &vals).unwrap();

        let stored = store.entries(offering.id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, entry.id);
        assert_eq!(stored[0].slot_length, SlotLength::Hour);
        assert_eq!(stored[0].values, vals);
    }

    #[test]
    fn test_append_entry_validates() {
        let mut store = SqliteStore::open_in_memory(CET).unwrap();
        let offering = store.get_or_create("Test Position", date(2024, 3, 31)).unwrap();
        let err = store.append_entry(&offering, 3600, &values(24)).unwrap_err();
        assert_eq!(err.to_string(), "Values count should be: 23, but are: 24");
        assert!(store.entries(offering.id).unwrap().is_empty());
    }

    #[test]
    fn test_append_entry_rejects_unknown_offering() {
        let mut store = SqliteStore::open_in_memory(CET).unwrap();
        let missing = DailyOffering {
            id: 42,
            position_name: "Test Position".to_string(),
            date: date(2024, 1, 15),
        };
        assert!(matches!(
            store.append_entry(&missing, 3600, &values(24)),
            Err(Error::Database(_))
        ));
        assert!(store.entries(42).unwrap().is_empty());
    }

    #[test]
    fn test_rollback_discards_rows() {
        let mut store = SqliteStore::open_in_memory(CET).unwrap();
        let result: Result<()> = atomically(&mut store, |store| {
            let offering = store.get_or_create("Dropped", date(2024, 1, 16))?;
            store.append_entry(&offering, 3600, &values(10))?;
            Ok(())
        });
        assert!(matches!(result, Err(Error::CountMismatch { .. })));
        assert!(store.offerings().unwrap().is_empty());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offering.db");
        {
            let mut store = SqliteStore::open(&path, CET).unwrap();
            let offering = store.get_or_create("FI_client1_FCRN", date(2025, 1, 16)).unwrap();
            store.append_entry(&offering, 3600, &values(24)).unwrap();
        }

        let store = SqliteStore::open(&path, CET).unwrap();
        let offerings = store.offerings().unwrap();
        assert_eq!(offerings.len(), 1);
        assert_eq!(offerings[0].to_string(), "2025-01-16 - FI_client1_FCRN");
        assert_eq!(store.entries(offerings[0].id).unwrap()[0].values.len(), 24);
    }
}
