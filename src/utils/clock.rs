use chrono::{DateTime, NaiveDate, Utc};
use savanna_db::DbError;

/// Timestamp text as stored in `created_at` columns.
pub fn now_text() -> String {
    Utc::now().to_rfc3339()
}

pub fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| DbError::InvalidData(format!("{column} '{value}': {err}")))
}

pub fn parse_date(column: &str, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| DbError::InvalidData(format!("{column} '{value}': {err}")))
}

/// Today's date in UTC, the reference for "not in the past" checks.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_timestamps_parse_back() {
        let text = now_text();
        assert!(parse_timestamp("created_at", &text).is_ok());
    }

    #[test]
    fn malformed_date_names_the_column() {
        let err = parse_date("travel_date", "12/07/2027").unwrap_err();
        assert!(err.to_string().contains("travel_date"));
    }
}
