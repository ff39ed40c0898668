//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a valid date.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}"))),
        _ => Ok(None),
    }
}

#[must_use]
pub fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all grc-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Decode a JSON array column (`'[]'` default) into a vector.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column is not a JSON array of `T`.
pub fn parse_json_vec<T: DeserializeOwned>(s: &str) -> Result<Vec<T>, DatabaseError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid JSON array in column: {e}")))
}

/// Encode a value for a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, DatabaseError> {
    Ok(serde_json::to_string(value)?)
}

/// `%term%` for `LIKE ... ESCAPE '\'`, with the term's own wildcards
/// matched literally.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `WHERE` conditions with numbered parameters for list queries.
#[derive(Debug, Default)]
pub(crate) struct WhereClause {
    conditions: Vec<String>,
    params: Vec<libsql::Value>,
}

impl WhereClause {
    /// Add `column = ?n` when `value` is present.
    pub(crate) fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: Into<libsql::Value>,
    {
        if let Some(value) = value {
            self.params.push(value.into());
            self.conditions.push(format!("{column} = ?{}", self.params.len()));
        }
        self
    }

    /// Add `expr BETWEEN ?n AND ?m`.
    pub(crate) fn between(&mut self, expr: &str, low: i64, high: i64) -> &mut Self {
        self.params.push(low.into());
        self.params.push(high.into());
        let n = self.params.len();
        self.conditions.push(format!("{expr} BETWEEN ?{} AND ?{n}", n - 1));
        self
    }

    /// Render as `WHERE ...` (empty when unconstrained) and hand back the
    /// parameters in placeholder order.
    pub(crate) fn finish(self) -> (String, Vec<libsql::Value>) {
        let sql = if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        };
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::enums::FindingStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn dates_roundtrip_through_text() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 30);
        let text = format_date(date);
        assert_eq!(text.as_deref(), Some("2026-06-30"));
        assert_eq!(parse_optional_date(text.as_deref()).unwrap(), date);
        assert_eq!(parse_optional_date(Some("")).unwrap(), None);
        assert!(parse_optional_date(Some("30/06/2026")).is_err());
    }

    #[test]
    fn parses_snake_case_enums() {
        let status: FindingStatus = parse_enum("in_progress").unwrap();
        assert_eq!(status, FindingStatus::InProgress);
        assert!(parse_enum::<FindingStatus>("in-progress").is_err());
    }

    #[test]
    fn where_clause_numbers_params_in_order() {
        let mut clause = WhereClause::default();
        clause
            .eq("status", Some("open"))
            .eq::<String>("owner", None)
            .between("likelihood * impact", 10, 16)
            .eq("actor", Some(String::from("j.doe")));
        let (sql, params) = clause.finish();
        assert_eq!(
            sql,
            "WHERE status = ?1 AND likelihood * impact BETWEEN ?2 AND ?3 AND actor = ?4"
        );
        assert_eq!(params.len(), 4);

        assert_eq!(WhereClause::default().finish().0, "");
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("mfa"), "%mfa%");
        assert_eq!(contains_pattern("100%_done"), r"%100\%\_done%");
        assert_eq!(contains_pattern(r"C:\evidence"), r"%C:\\evidence%");
    }

    #[test]
    fn json_vec_columns() {
        let ids: Vec<String> = parse_json_vec(r#"["ctx-4","support-7"]"#).unwrap();
        assert_eq!(ids, vec!["ctx-4", "support-7"]);
        assert!(parse_json_vec::<String>("").unwrap().is_empty());
        assert!(parse_json_vec::<String>("{").is_err());
    }
}
