//! Offering submission payloads and their all-or-nothing processing.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use offering_core::{atomically, Config, Error, OfferingStore, Result, SlotLength};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bucketer::DayBucketer;

const REFERENCE_MAX_LEN: usize = 100;
const UNIT_MAX_LEN: usize = 10;

/// One item of an upload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingPayloadItem {
    /// Position identifier, e.g. `FI_client1_FCRN`.
    pub reference: String,
    /// Unit of the values (`MW`), informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Instant of the first slot.
    pub start_time: DateTime<FixedOffset>,
    /// Nominal slot length in seconds.
    pub slot_length: i64,
    /// One value per slot.
    pub values: Vec<String>,
}

impl OfferingPayloadItem {
    /// Field-level checks that need no calendar arithmetic.
    pub fn validate(&self) -> Result<SlotLength> {
        let reference_len = self.reference.chars().count();
        if reference_len == 0 || reference_len > REFERENCE_MAX_LEN {
            return Err(Error::validation(format!(
                "reference must be 1 to {REFERENCE_MAX_LEN} characters"
            )));
        }
        if let Some(unit) = &self.unit {
            if unit.chars().count() > UNIT_MAX_LEN {
                return Err(Error::validation(format!(
                    "unit must be at most {UNIT_MAX_LEN} characters"
                )));
            }
        }
        let slot_length = SlotLength::try_from(self.slot_length)?;
        if self.values.is_empty() {
            return Err(Error::validation("values must not be empty"));
        }
        Ok(slot_length)
    }
}

/// Parse a JSON upload request (an array of items).
pub fn parse_payload(json: &str) -> Result<Vec<OfferingPayloadItem>> {
    Ok(serde_json::from_str(json)?)
}

/// Result of a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub message: String,
    pub details: UploadDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDetails {
    /// Distinct dates written, ascending.
    pub trading_days: Vec<NaiveDate>,
}

impl UploadReport {
    fn stored(trading_days: BTreeSet<NaiveDate>) -> Self {
        Self {
            message: "Data stored successfully".to_string(),
            details: UploadDetails {
                trading_days: trading_days.into_iter().collect(),
            },
        }
    }
}

/// Validates and stores whole submissions.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionProcessor {
    bucketer: DayBucketer,
}

impl SubmissionProcessor {
    pub fn new(timezone: Tz) -> Self {
        Self {
            bucketer: DayBucketer::new(timezone),
        }
    }

    /// Build from configuration, resolving the trading timezone.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.trading_timezone()?))
    }

    /// Store every item of a submission in one transaction.
    ///
    /// All items are validated before anything is written; any failure while
    /// writing rolls the whole submission back.
    pub fn process<S>(&self, store: &mut S, items: &[OfferingPayloadItem]) -> Result<UploadReport>
    where
        S: OfferingStore + ?Sized,
    {
        if items.is_empty() {
            return Err(Error::validation("submission must contain at least one item"));
        }
        let slot_lengths = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.validate().map_err(|err| match err {
                    Error::Validation(msg) => Error::validation(format!("item {index}: {msg}")),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let result = atomically(store, |store| {
            let mut trading_days = BTreeSet::new();
            for (item, slot_length) in items.iter().zip(slot_lengths) {
                let dates = self.bucketer.ingest(
                    &mut *store,
                    &item.reference,
                    &item.start_time,
                    slot_length,
                    &item.values,
                )?;
                trading_days.extend(dates);
            }
            Ok(trading_days)
        });

        match result {
            Ok(trading_days) => {
                info!(
                    items = items.len(),
                    days = trading_days.len(),
                    "stored offering submission"
                );
                Ok(UploadReport::stored(trading_days))
            }
            Err(err) => {
                warn!(error = %err, "offering submission rolled back");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[{
        "reference": "FI_client1_FCRN",
        "unit": "MW",
        "startTime": "2025-05-22T22:00:00Z",
        "slotLength": 3600,
        "values": ["1.0", "2.0"]
    }]"#;

    fn item() -> OfferingPayloadItem {
        parse_payload(PAYLOAD).unwrap().remove(0)
    }

    #[test]
    fn test_parse_payload() {
        let item = item();
        assert_eq!(item.reference, "FI_client1_FCRN");
        assert_eq!(item.unit.as_deref(), Some("MW"));
        assert_eq!(item.slot_length, 3600);
        assert_eq!(item.values, vec!["1.0", "2.0"]);
        assert_eq!(item.start_time.to_rfc3339(), "2025-05-22T22:00:00+00:00");
    }

    #[test]
    fn test_parse_payload_without_unit() {
        let items = parse_payload(
            r#"[{"reference": "SE_x", "startTime": "2025-05-22T22:00:00Z", "slotLength": 3600, "values": []}]"#,
        )
        .unwrap();
        assert!(items[0].unit.is_none());
    }

    #[test]
    fn test_parse_payload_missing_fields() {
        let result = parse_payload(r#"[{"reference": "FI_client1_FCRN", "unit": "MW"}]"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_validate_accepts_item() {
        assert_eq!(item().validate().unwrap(), SlotLength::Hour);
    }

    #[test]
    fn test_validate_rejects_slot_length() {
        let mut item = item();
        item.slot_length = 1234;
        assert!(matches!(item.validate(), Err(Error::UnrecognizedSlotLength(1234))));
    }

    #[test]
    fn test_validate_rejects_field_lengths() {
        let mut long_reference = item();
        long_reference.reference = "R".repeat(101);
        assert!(matches!(long_reference.validate(), Err(Error::Validation(_))));

        let mut empty_reference = item();
        empty_reference.reference.clear();
        assert!(empty_reference.validate().is_err());

        let mut long_unit = item();
        long_unit.unit = Some("megawatthours".to_string());
        assert!(long_unit.validate().is_err());

        let mut no_values = item();
        no_values.values.clear();
        assert!(no_values.validate().is_err());
    }

    #[test]
    fn test_report_serialization() {
        let days = [NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(), NaiveDate::from_ymd_opt(2025, 1, 16).unwrap()];
        let report = UploadReport::stored(days.into_iter().collect());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["message"], "Data stored successfully");
        assert_eq!(json["details"]["trading_days"][0], "2025-01-16");
        assert_eq!(json["details"]["trading_days"][1], "2025-01-17");
    }
}
