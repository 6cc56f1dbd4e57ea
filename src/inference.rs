//! Column type inference
//!
//! Every candidate column is a list of raw JSON cells, one per row. A column
//! gets exactly one type out of datetime, number, boolean and string:
//!
//! 1. non-null cells vote for a type based on their JSON kind, with strings
//!    that look like ISO-8601 timestamps voting for datetime;
//! 2. the type with the most votes wins, ties going to the type seen first;
//! 3. a string column whose name looks time related is promoted to datetime
//!    when more than half of its non-null cells parse as timestamps;
//! 4. cells that cannot be converted to the winning type become `None`.
//!
//! Inference never fails; the worst case is a string column of nulls.

use crate::frame::{Column, ColumnType, ColumnValues};
use crate::value::display_value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static DATETIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 2025-01-21T12:33:54.045Z
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?Z?$",
        // 2025-01-21T12:33:54.045+01:00
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?[+-][0-9]{2}:[0-9]{2}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("datetime pattern must compile"))
    .collect()
});

/// Lowercase substrings that mark a column name as time related.
const DATETIME_FIELD_HINTS: &[&str] = &[
    "time",
    "date",
    "created",
    "updated",
    "modified",
    "timestamp",
    "createdtime",
    "updatedtime",
    "modifiedtime",
    "createdat",
    "updatedat",
    "lastupdated",
    "lastmodified",
    "lastaccessed",
    "expiry",
    "expires",
];

/// A timestamp layout tried when converting strings to datetimes.
#[derive(Debug, Clone, Copy)]
enum DateTimeLayout {
    /// RFC 3339 with optional fractional seconds and a `Z` or numeric offset
    Rfc3339,
    /// Date and time without offset, read as UTC
    Naive(&'static str),
    /// Bare date, read as midnight UTC
    Date(&'static str),
}

/// Layouts in trial order; the first one that parses wins.
const DATETIME_LAYOUTS: &[DateTimeLayout] = &[
    DateTimeLayout::Rfc3339,
    DateTimeLayout::Naive("%Y-%m-%dT%H:%M:%S%.f"),
    DateTimeLayout::Naive("%Y-%m-%dT%H:%M:%S%.fZ"),
    DateTimeLayout::Naive("%Y-%m-%d %H:%M:%S"),
    DateTimeLayout::Date("%Y-%m-%d"),
];

impl DateTimeLayout {
    fn parse(self, input: &str) -> Option<DateTime<Utc>> {
        match self {
            DateTimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(input)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateTimeLayout::Naive(format) => NaiveDateTime::parse_from_str(input, format)
                .ok()
                .map(|naive| naive.and_utc()),
            DateTimeLayout::Date(format) => NaiveDate::parse_from_str(input, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc()),
        }
    }
}

static NULL: Value = Value::Null;

/// True if `input` has the shape of an ISO-8601 timestamp.
///
/// Only the shape is checked; `2024-13-45T99:00:00Z` matches but will not parse.
pub fn is_datetime_string(input: &str) -> bool {
    DATETIME_PATTERNS.iter().any(|pattern| pattern.is_match(input))
}

/// True if the column name suggests the column holds timestamps.
pub fn is_datetime_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    DATETIME_FIELD_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Parses a timestamp string using the explicit layout list.
pub fn parse_datetime(input: &str) -> Option<DateTime<Utc>> {
    for layout in DATETIME_LAYOUTS {
        if let Some(parsed) = layout.parse(input) {
            log::trace!("Converted datetime {:?} using {:?}", input, layout);
            return Some(parsed);
        }
    }
    log::debug!("Failed to convert datetime {:?}", input);
    None
}

/// Converts a cell to a datetime; only strings are candidates.
pub fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        _ => None,
    }
}

/// Converts a cell to a number, accepting JSON numbers and numeric strings.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Type a single non-null cell votes for; `None` for null.
fn vote(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::String(s) if is_datetime_string(s) => Some(ColumnType::DateTime),
        Value::Number(_) => Some(ColumnType::Number),
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::String(_) | Value::Array(_) | Value::Object(_) => Some(ColumnType::String),
    }
}

/// Infers the type of a column from its cells and name.
pub fn infer_column_type(name: &str, values: &[&Value]) -> ColumnType {
    // Tally in first-encountered order so ties resolve deterministically.
    let mut tally: Vec<(ColumnType, usize)> = Vec::with_capacity(4);
    for value in values {
        if let Some(column_type) = vote(value) {
            match tally.iter_mut().find(|(t, _)| *t == column_type) {
                Some((_, count)) => *count += 1,
                None => tally.push((column_type, 1)),
            }
        }
    }

    let mut best = ColumnType::String;
    let mut best_count = 0;
    for (column_type, count) in &tally {
        if *count > best_count {
            best = *column_type;
            best_count = *count;
        }
    }

    if best == ColumnType::String && is_datetime_field(name) {
        let non_null = values.iter().filter(|v| !v.is_null()).count();
        let parsed = values.iter().filter(|v| to_datetime(v).is_some()).count();
        if parsed * 2 > non_null {
            log::debug!(
                "Column {:?} promoted to datetime ({} of {} values parsed)",
                name,
                parsed,
                non_null
            );
            best = ColumnType::DateTime;
        }
    }

    best
}

/// Converts every cell to `column_type`, using `None` for nulls and failures.
pub fn materialize(column_type: ColumnType, values: &[&Value]) -> ColumnValues {
    match column_type {
        ColumnType::DateTime => {
            ColumnValues::DateTime(values.iter().map(|v| to_datetime(v)).collect())
        }
        ColumnType::Number => ColumnValues::Number(values.iter().map(|v| to_number(v)).collect()),
        ColumnType::Boolean => ColumnValues::Boolean(values.iter().map(|v| v.as_bool()).collect()),
        ColumnType::String => ColumnValues::String(
            values
                .iter()
                .map(|v| (!v.is_null()).then(|| display_value(v)))
                .collect(),
        ),
    }
}

/// Infers and materializes a typed column from raw cells.
pub fn infer_column(name: &str, values: &[&Value]) -> ColumnValues {
    materialize(infer_column_type(name, values), values)
}

/// Builds a typed column from optional cells; `None` stands for a missing key.
pub fn build_column(name: &str, cells: &[Option<&Value>]) -> Column {
    let values: Vec<&Value> = cells.iter().map(|cell| cell.unwrap_or(&NULL)).collect();
    Column::new(name, infer_column(name, &values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn refs(values: &[Value]) -> Vec<&Value> {
        values.iter().collect()
    }

    #[test]
    fn test_majority_number_wins() {
        let values = [json!(1), json!(2), json!("x")];
        let column = infer_column("count", &refs(&values));
        assert_eq!(
            column,
            ColumnValues::Number(vec![Some(1.0), Some(2.0), None])
        );
    }

    #[test]
    fn test_field_name_hint_with_unparsable_cell() {
        init_logging();
        let values = [
            json!("2024-01-01T00:00:00Z"),
            json!("2024-01-02T00:00:00Z"),
            json!("n/a"),
        ];
        let column = infer_column("updatedAt", &refs(&values));
        assert_eq!(
            column,
            ColumnValues::DateTime(vec![
                Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
                None,
            ])
        );
    }

    #[test]
    fn test_field_name_hint_promotes_string_column() {
        init_logging();
        // None of these match the ISO shape, so the vote says string.
        let values = [
            json!("2024-03-01 10:15:00"),
            json!("2024-03-02"),
            json!("soon"),
            Value::Null,
        ];
        let column = infer_column("createdTime", &refs(&values));
        assert_eq!(
            column,
            ColumnValues::DateTime(vec![
                Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()),
                Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
                None,
                None,
            ])
        );
    }

    #[test]
    fn test_field_name_hint_needs_majority() {
        let values = [json!("2024-03-02"), json!("later"), json!("never")];
        let column_type = infer_column_type("expires", &refs(&values));
        assert_eq!(column_type, ColumnType::String);
    }

    #[test]
    fn test_same_values_without_hint_stay_strings() {
        let values = [json!("2024-03-01 10:15:00"), json!("2024-03-02")];
        let column = infer_column("label", &refs(&values));
        assert_eq!(
            column,
            ColumnValues::String(vec![
                Some("2024-03-01 10:15:00".to_string()),
                Some("2024-03-02".to_string()),
            ])
        );
    }

    #[test]
    fn test_numeric_column_named_timestamp_stays_number() {
        let values = [json!(1704067200000_i64), json!(1704067201000_i64)];
        assert_eq!(infer_column_type("timestamp", &refs(&values)), ColumnType::Number);
    }

    #[test]
    fn test_tie_goes_to_first_encountered() {
        let values = [json!(true), json!(1), json!(false), json!(2)];
        assert_eq!(infer_column_type("flag", &refs(&values)), ColumnType::Boolean);

        let values = [json!(1), json!(true), json!(2), json!(false)];
        assert_eq!(infer_column_type("flag", &refs(&values)), ColumnType::Number);
    }

    #[test]
    fn test_all_null_defaults_to_string() {
        let values = [Value::Null, Value::Null];
        let column = infer_column("anything", &refs(&values));
        assert_eq!(column, ColumnValues::String(vec![None, None]));
    }

    #[test]
    fn test_empty_column() {
        assert_eq!(infer_column("x", &[]), ColumnValues::String(Vec::new()));
    }

    #[test]
    fn test_number_column_accepts_numeric_strings() {
        let values = [json!(1.5), json!("2.25"), json!(3), json!(true), Value::Null];
        assert_eq!(
            infer_column("value", &refs(&values)),
            ColumnValues::Number(vec![Some(1.5), Some(2.25), Some(3.0), None, None])
        );
    }

    #[test]
    fn test_boolean_column_nulls_non_booleans() {
        let values = [json!(true), json!(false), json!("true")];
        assert_eq!(
            infer_column("active", &refs(&values)),
            ColumnValues::Boolean(vec![Some(true), Some(false), None])
        );
    }

    #[test]
    fn test_nested_values_are_stringified() {
        let values = [json!({"a": 1}), json!([1, 2]), json!("x")];
        assert_eq!(
            infer_column("meta", &refs(&values)),
            ColumnValues::String(vec![
                Some(r#"{"a":1}"#.to_string()),
                Some("[1,2]".to_string()),
                Some("x".to_string()),
            ])
        );
    }

    #[test]
    fn test_datetime_shape_that_does_not_parse_becomes_null() {
        let values = [json!("2024-13-45T10:00:00Z"), json!("2024-01-05T10:00:00Z")];
        assert_eq!(
            infer_column("x", &refs(&values)),
            ColumnValues::DateTime(vec![
                None,
                Some(Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap()),
            ])
        );
    }

    #[test]
    fn test_non_ascii_digits_stay_strings() {
        assert!(!is_datetime_string("٢٠٢٤-٠١-٠١T٠٠:٠٠:٠٠Z"));
        let values = [json!("٢٠٢٤-٠١-٠١T٠٠:٠٠:٠٠Z"), json!("١٩٩٩-٠١-٠١T٠٠:٠٠:٠٠Z")];
        assert_eq!(
            infer_column("code", &refs(&values)),
            ColumnValues::String(vec![
                Some("٢٠٢٤-٠١-٠١T٠٠:٠٠:٠٠Z".to_string()),
                Some("١٩٩٩-٠١-٠١T٠٠:٠٠:٠٠Z".to_string()),
            ])
        );
    }

    #[test]
    fn test_is_datetime_string() {
        assert!(is_datetime_string("2025-01-21T12:33:54Z"));
        assert!(is_datetime_string("2025-01-21T12:33:54.045Z"));
        assert!(is_datetime_string("2025-01-21T12:33:54.045"));
        assert!(is_datetime_string("2025-01-21T12:33:54+01:00"));
        assert!(is_datetime_string("2025-01-21T12:33:54.045-05:30"));
        assert!(!is_datetime_string("2025-01-21 12:33:54"));
        assert!(!is_datetime_string("2025-01-21"));
        assert!(!is_datetime_string("yesterday"));
    }

    #[test]
    fn test_is_datetime_field() {
        assert!(is_datetime_field("createdTime"));
        assert!(is_datetime_field("LAST_UPDATED"));
        assert!(is_datetime_field("expiresOn"));
        assert!(is_datetime_field("startDate"));
        assert!(!is_datetime_field("name"));
        assert!(!is_datetime_field("externalId"));
    }

    #[test]
    fn test_parse_datetime_layouts() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 21, 12, 33, 54).unwrap();
        assert_eq!(parse_datetime("2025-01-21T12:33:54Z"), Some(expected));
        assert_eq!(parse_datetime("2025-01-21T13:33:54+01:00"), Some(expected));
        assert_eq!(parse_datetime("2025-01-21T12:33:54"), Some(expected));
        assert_eq!(parse_datetime("2025-01-21 12:33:54"), Some(expected));
        assert_eq!(
            parse_datetime("2025-01-21"),
            Some(Utc.with_ymd_and_hms(2025, 1, 21, 0, 0, 0).unwrap())
        );

        let with_millis = parse_datetime("2025-01-21T12:33:54.045Z").unwrap();
        assert_eq!(with_millis.timestamp_subsec_millis(), 45);
        let naive_micros = parse_datetime("2025-01-21T12:33:54.045123").unwrap();
        assert_eq!(naive_micros.timestamp_subsec_micros(), 45123);

        assert_eq!(parse_datetime("21/01/2025"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn test_build_column_missing_cells_are_null() {
        let one = json!(1);
        let column = build_column("n", &[Some(&one), None, Some(&Value::Null)]);
        assert_eq!(column.name, "n");
        assert_eq!(column.values, ColumnValues::Number(vec![Some(1.0), None, None]));
    }
}
