//! Dynamic value type for storage rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single cell of a storage row.
///
/// Date and timestamp columns are carried as ISO-8601 text; conversion to and
/// from `chrono` types happens in the record (de)serializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Text coercion: integers render as their decimal form, `Null` is absent.
    pub fn text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Int(i) => Some(i.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    /// Integer coercion: numeric text parses, everything else is absent.
    pub fn int(&self) -> Option<i64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Int(i) => Some(*i),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.text()
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.text()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn from_opt_text(value: Option<&str>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s.to_string()),
            None => FieldValue::Null,
        }
    }

    pub fn from_opt_int(value: Option<i64>) -> Self {
        match value {
            Some(i) => FieldValue::Int(i),
            None => FieldValue::Null,
        }
    }

    pub fn from_opt_date(value: Option<NaiveDate>) -> Self {
        match value {
            Some(d) => FieldValue::Text(d.format("%Y-%m-%d").to_string()),
            None => FieldValue::Null,
        }
    }

    pub fn from_opt_datetime(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(dt) => FieldValue::Text(dt.to_rfc3339()),
            None => FieldValue::Null,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

/// Errors from positional row deserialization.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("row for {table} too short: expected at least {expected} fields, got {got}")]
    ShortRow {
        table: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("column {column}: {detail}")]
    BadValue { column: &'static str, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercions() {
        assert_eq!(FieldValue::Int(5).text().as_deref(), Some("5"));
        assert_eq!(FieldValue::Text("7".into()).int(), Some(7));
        assert_eq!(FieldValue::Text("seven".into()).int(), None);
        assert_eq!(FieldValue::Null.text(), None);
        assert_eq!(FieldValue::Null.int(), None);
    }

    #[test]
    fn date_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let v = FieldValue::from_opt_date(Some(d));
        assert_eq!(v.date(), Some(d));
        assert_eq!(FieldValue::from_opt_date(None), FieldValue::Null);
    }

    #[test]
    fn datetime_round_trip() {
        let dt = DateTime::parse_from_rfc3339("2023-01-15T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let v = FieldValue::from_opt_datetime(Some(dt));
        assert_eq!(v.datetime(), Some(dt));
    }

    #[test]
    fn malformed_date_is_absent() {
        assert_eq!(FieldValue::Text("not-a-date".into()).date(), None);
    }
}
