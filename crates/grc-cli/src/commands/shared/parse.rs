use chrono::NaiveDate;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(raw: &str, field: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}' (expected YYYY-MM-DD): {error}"))
}

pub fn parse_optional_date(raw: Option<&str>, field: &str) -> anyhow::Result<Option<NaiveDate>> {
    raw.map(|value| parse_date(value, field)).transpose()
}

#[cfg(test)]
mod tests {
    use grc_core::enums::{FindingStatus, TestResult};

    use super::{parse_date, parse_enum};

    #[test]
    fn parses_snake_case_enum() {
        let status: FindingStatus =
            parse_enum("in_progress", "status").expect("status should parse");
        assert_eq!(status, FindingStatus::InProgress);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let result: TestResult =
            parse_enum("non-conformity", "result").expect("result should parse");
        assert_eq!(result, TestResult::NonConformity);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<FindingStatus>("done", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'done'"));
    }

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("2026-03-31", "start").expect("date should parse");
        assert_eq!(date.to_string(), "2026-03-31");
        assert!(parse_date("31/03/2026", "start").is_err());
    }
}
