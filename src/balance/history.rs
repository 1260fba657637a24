use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::decimal::Money;
use crate::errors::{MortgageError, Result};
use crate::format::{parse_currency, parse_day_first_date};

/// a recorded payment against the mortgage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub date: NaiveDate,
    pub amount: Money,
}

impl PaymentEvent {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }
}

/// supplies the payment history for one replay
///
/// Read once per replay; the returned events are treated as a snapshot.
pub trait PaymentSource {
    fn payments(&self) -> Result<Vec<PaymentEvent>>;
}

impl PaymentSource for Vec<PaymentEvent> {
    fn payments(&self) -> Result<Vec<PaymentEvent>> {
        Ok(self.clone())
    }
}

/// two-column `payment_date,amount` CSV file with a header line
#[derive(Debug, Clone)]
pub struct CsvPaymentSource {
    path: PathBuf,
}

impl CsvPaymentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PaymentSource for CsvPaymentSource {
    fn payments(&self) -> Result<Vec<PaymentEvent>> {
        let file = File::open(&self.path)?;
        let events = read_payments(file)?;
        tracing::debug!(path = %self.path.display(), count = events.len(), "payment history loaded");
        Ok(events)
    }
}

fn malformed(line: u64, message: impl Into<String>) -> MortgageError {
    MortgageError::MalformedPaymentRecord {
        line,
        message: message.into(),
    }
}

/// parse payment records from any reader; the first line is a header
///
/// Any bad record fails the whole read; there is no partial result.
pub fn read_payments<R: Read>(reader: R) -> Result<Vec<PaymentEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut events = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // header occupies line 1
        let fallback_line = idx as u64 + 2;
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
            malformed(line, e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.len() < 2 {
            return Err(malformed(line, format!("expected 2 fields, found {}", record.len())));
        }

        let date = parse_day_first_date(&record[0])
            .ok_or_else(|| malformed(line, format!("unparseable payment date '{}'", &record[0])))?;
        let amount = parse_currency(&record[1])
            .ok_or_else(|| malformed(line, format!("unparseable amount '{}'", &record[1])))?;

        events.push(PaymentEvent::new(date, Money::from_decimal(amount)));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_payments_with_formatted_amounts() {
        let csv = "payment_date,amount\n15/12/2024,\"£1,500.00\"\n15-01-2025,1500.5\n";
        let events = read_payments(csv.as_bytes()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], PaymentEvent::new(date(2024, 12, 15), Money::from_major(1_500)));
        assert_eq!(events[1].date, date(2025, 1, 15));
        assert_eq!(events[1].amount, Money::from_decimal(dec!(1500.5)));
    }

    #[test]
    fn test_header_only_is_empty() {
        let events = read_payments("payment_date,amount\n".as_bytes()).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_bad_date_reports_line() {
        let csv = "payment_date,amount\n15/12/2024,100\n2025-01-15,100\n";
        match read_payments(csv.as_bytes()) {
            Err(MortgageError::MalformedPaymentRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed record, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let csv = "payment_date,amount\n15/12/2024,n/a\n";
        assert!(matches!(
            read_payments(csv.as_bytes()),
            Err(MortgageError::MalformedPaymentRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_csv_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "payment_date,amount").unwrap();
        writeln!(file, "01/02/2024,250").unwrap();

        let source = CsvPaymentSource::new(file.path());
        let events = source.payments().unwrap();
        assert_eq!(events, vec![PaymentEvent::new(date(2024, 2, 1), Money::from_major(250))]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CsvPaymentSource::new("/nonexistent/payment_schedule.csv");
        assert!(matches!(source.payments(), Err(MortgageError::Io(_))));
    }
}
