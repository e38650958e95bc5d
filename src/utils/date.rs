// Date helpers shared by the store and the CLI
// Calendar dates are stored as ISO text (YYYY-MM-DD)

use chrono::{Duration, Local, NaiveDate};
use anyhow::Result;

/// Storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a date for storage
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date column
pub fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Parse a user-supplied date expression
/// Supports absolute dates (2026-01-10) and the words `today` and `tomorrow`
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    if let Some(date) = parse_stored_date(expr) {
        return Ok(date);
    }

    let today = Local::now().date_naive();
    match expr {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => anyhow::bail!("Unsupported date expression: '{}'. Use YYYY-MM-DD, today or tomorrow.", expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_parse_stored() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(format_date(date), "2026-01-10");
        assert_eq!(parse_stored_date("2026-01-10"), Some(date));
        assert_eq!(parse_stored_date("10/01/2026"), None);
    }

    #[test]
    fn test_parse_date_expr_relative() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date_expr("today").unwrap(), today);
        assert!(parse_date_expr("tomorrow").unwrap() > today);
        assert!(parse_date_expr("next week").is_err());
    }
}
