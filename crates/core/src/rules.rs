//! Market and sale definitions.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time_slot::parse_timezone;

const MARKET_CODE_MAX_LEN: usize = 20;

/// A market offerings are sold on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    pub code: String,
}

impl Market {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.is_empty() || code.chars().count() > MARKET_CODE_MAX_LEN {
            return Err(Error::validation(format!(
                "market code must be 1 to {MARKET_CODE_MAX_LEN} characters"
            )));
        }
        Ok(Self { code })
    }
}

/// When a sale closes and publishes results, relative to the delivery day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDefinition {
    pub name: String,
    /// Days before delivery the sale happens on.
    pub days_offset: i32,
    pub gate_close_time: NaiveTime,
    pub result_time: NaiveTime,
    pub timezone_name: String,
}

impl SaleDefinition {
    /// Check all fields, reporting every violation at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.days_offset <= 0 {
            problems.push("days_offset must be greater than 0".to_string());
        }
        if parse_timezone(&self.timezone_name).is_err() {
            problems.push(format!("Unknown timezone: {}", self.timezone_name));
        }
        if self.result_time <= self.gate_close_time {
            problems.push("result_time must be greater than gate_close_time".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_sale_definition() -> SaleDefinition {
        SaleDefinition {
            name: "Test Sale".to_string(),
            days_offset: 1,
            gate_close_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            result_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            timezone_name: "CET".to_string(),
        }
    }

    fn messages(def: &SaleDefinition) -> String {
        def.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_valid_sale_definition() {
        assert!(valid_sale_definition().validate().is_ok());
    }

    #[test]
    fn test_invalid_days_offset() {
        let mut def = valid_sale_definition();
        def.days_offset = 0;
        assert!(messages(&def).contains("days_offset must be greater than 0"));
    }

    #[test]
    fn test_invalid_timezone_name() {
        let mut def = valid_sale_definition();
        def.timezone_name = "Invalid/Timezone".to_string();
        assert!(messages(&def).contains("Unknown timezone: Invalid/Timezone"));
    }

    #[test]
    fn test_result_time_not_after_gate_close() {
        let mut def = valid_sale_definition();
        def.result_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert!(messages(&def).contains("result_time must be greater than gate_close_time"));

        def.result_time = def.gate_close_time;
        assert!(messages(&def).contains("result_time must be greater than gate_close_time"));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut def = valid_sale_definition();
        def.days_offset = -1;
        def.timezone_name = "Nowhere".to_string();
        let msg = messages(&def);
        assert!(msg.contains("days_offset"));
        assert!(msg.contains("Unknown timezone: Nowhere"));
    }

    #[test]
    fn test_market_code_length() {
        assert!(Market::new("FI_FCR").is_ok());
        assert!(Market::new("").is_err());
        assert!(Market::new("X".repeat(21)).is_err());
    }
}
