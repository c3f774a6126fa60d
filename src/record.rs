// Expense Tracker - Record Model
// The single persisted entity plus the textual date/amount rules shared by
// the store and the chat front end.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{StoreError, StoreResult};

/// Textual date format used on every external surface
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format used for the `date` column (sorts lexicographically)
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// RECORD
// ============================================================================

/// One stored expense. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub name: String,
    #[serde(with = "dotted_date")]
    pub date: NaiveDate,
    pub amount: f64,
}

impl ExpenseRecord {
    /// Date rendered as `dd.mm.yyyy`
    pub fn date_text(&self) -> String {
        format_date(self.date)
    }
}

/// Body of add/edit requests. The date stays textual until the store parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub name: String,
    pub date: String,
    pub amount: f64,
}

impl ExpensePayload {
    pub fn new(name: impl Into<String>, date: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            amount,
        }
    }

    /// Validate every field, returning the values ready for storage
    pub fn validate(&self) -> StoreResult<ValidExpense> {
        Ok(ValidExpense {
            name: validate_name(&self.name)?,
            date: parse_date(&self.date)?,
            amount: validate_amount(self.amount)?,
        })
    }
}

/// Fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense {
    pub name: String,
    pub date: NaiveDate,
    pub amount: f64,
}

// ============================================================================
// FIELD RULES
// ============================================================================

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid date regex"))
}

/// Cheap shape check: exactly `dd.mm.yyyy` digits and dots
pub fn is_date_shaped(text: &str) -> bool {
    date_pattern().is_match(text)
}

/// Parse `dd.mm.yyyy` into a real calendar date
///
/// Both the shape and the calendar are checked, so `2024-01-01`, `1.1.2024`
/// and `31.13.2024` are all rejected.
pub fn parse_date(text: &str) -> StoreResult<NaiveDate> {
    let trimmed = text.trim();
    if !is_date_shaped(trimmed) {
        return Err(StoreError::InvalidDateFormat(text.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDateFormat(text.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse free text as an amount. Negative values are allowed.
pub fn parse_amount(text: &str) -> StoreResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| StoreError::InvalidNumber(text.to_string()))?;
    validate_amount(value)
}

/// Reject NaN and infinities, which SQLite and JSON cannot round-trip
pub fn validate_amount(amount: f64) -> StoreResult<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(StoreError::InvalidNumber(amount.to_string()))
    }
}

pub fn validate_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Serde adapter keeping dates as `dd.mm.yyyy` strings on the wire
mod dotted_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_date(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_accepts_dotted_format() {
        let date = parse_date("15.01.2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(format_date(date), "15.01.2024");
    }

    #[test]
    fn test_parse_date_rejects_malformed() {
        for bad in ["2024-01-01", "31.13.2024", "30.02.2024", "1.1.2024", "01.01.24", "", "abc", "01.01.2024x"] {
            assert!(
                matches!(parse_date(bad), Err(StoreError::InvalidDateFormat(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_date_trims_whitespace() {
        assert!(parse_date("  29.02.2024 ").is_ok());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5").unwrap(), 12.5);
        assert_eq!(parse_amount(" -3 ").unwrap(), -3.0);
        assert!(matches!(parse_amount("abc"), Err(StoreError::InvalidNumber(_))));
        assert!(matches!(parse_amount("NaN"), Err(StoreError::InvalidNumber(_))));
        assert!(matches!(parse_amount("inf"), Err(StoreError::InvalidNumber(_))));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Coffee ").unwrap(), "Coffee");
        assert!(matches!(validate_name("   "), Err(StoreError::EmptyName)));
    }

    #[test]
    fn test_record_json_uses_dotted_date() {
        let record = ExpenseRecord {
            id: 1,
            name: "Lunch".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            amount: 9.5,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "05.03.2024");

        let back: ExpenseRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_payload_validate() {
        let valid = ExpensePayload::new(" Taxi ", "01.02.2024", 20.0).validate().unwrap();
        assert_eq!(valid.name, "Taxi");

        let bad_date = ExpensePayload::new("Taxi", "2024-02-01", 20.0).validate();
        assert!(matches!(bad_date, Err(StoreError::InvalidDateFormat(_))));
    }
}
