use chrono::{NaiveDate, NaiveTime, SecondsFormat};

/// Canonical timestamp for a picked day: midnight UTC, millisecond
/// precision, `Z` suffix (`2024-10-01T00:00:00.000Z`).
pub fn format_boundary(day: NaiveDate) -> String {
    day.and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a `YYYY-MM-DD` day.
pub fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a YYYY-MM-DD date", raw.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_midnight_utc_with_millis() {
        let day = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        assert_eq!(format_boundary(day), "2024-10-01T00:00:00.000Z");
    }

    #[test]
    fn parse_day_rejects_other_formats() {
        assert!(parse_day("2024-10-01").is_ok());
        assert!(parse_day("01/10/2024").is_err());
    }
}
