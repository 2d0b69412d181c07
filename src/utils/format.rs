//! Display formatting helpers for legends, tables and axis labels

use chrono::NaiveDate;

/// Format a dollar amount with two decimal places, e.g. `$150000.00`
pub fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

/// Format a date as ISO `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a value in thousands with one decimal place, e.g. `102.5k`
pub fn format_thousands(value: f64) -> String {
    format!("{:.1}k", value / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_two_decimals() {
        assert_eq!(format_currency(150000.0), "$150000.00");
        assert_eq!(format_currency(99.555), "$99.56");
    }

    #[test]
    fn test_date_iso() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(format_date(d), "2023-12-31");
    }

    #[test]
    fn test_thousands_label() {
        assert_eq!(format_thousands(102540.0), "102.5k");
        assert_eq!(format_thousands(500.0), "0.5k");
    }
}
