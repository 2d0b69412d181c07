//! Trade history CSV export

use crate::models::Trade;
use crate::utils::format::format_date;

const CSV_HEADER: &str = "Date,Type,Asset,Quantity,Price,Value,Reason";

/// Render the trade log as CSV, one row per trade
pub fn trades_to_csv(trades: &[Trade]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for t in trades {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            format_date(t.date),
            t.kind,
            t.asset,
            t.quantity,
            t.price,
            t.value,
            csv_escape(&t.reason),
        ));
    }
    out
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trade(reason: &str) -> Trade {
        Trade {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            kind: "BUY".to_string(),
            asset: "EQUITY".to_string(),
            quantity: 10.0,
            price: 100.0,
            value: 1000.0,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = trades_to_csv(&[trade("Initial")]);
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Date,Type,Asset,Quantity,Price,Value,Reason"
        );
        assert_eq!(lines.next().unwrap(), "2023-01-01,BUY,EQUITY,10,100,1000,Initial");
    }

    #[test]
    fn test_reason_with_comma_is_quoted() {
        let csv = trades_to_csv(&[trade("Rebalance, drift exceeded")]);

        assert!(csv.contains("\"Rebalance, drift exceeded\""));
    }
}
