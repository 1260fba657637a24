//! Display formatting applied at the sink boundary.
//!
//! Ledgers stay numeric; these helpers turn `Money`, `Rate` and dates into
//! the strings written to exported tables and summary lines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::decimal::{Money, Rate};

pub const CURRENCY_SYMBOL: &str = "£";

/// day-first date formats accepted from payment histories and requests
const DAY_FIRST_FORMATS: [&str; 2] = ["%d/%m/%Y", "%d-%m-%Y"];

/// `1234567.891` -> `1,234,567.89`
pub fn format_amount(amount: Money) -> String {
    format_grouped(amount.as_decimal())
}

/// `1234.5` -> `£1,234.50`
pub fn format_currency(amount: Money) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_amount(amount))
}

/// fraction as a two-place percentage, `0.12346` -> `12.35%`
pub fn format_percent(fraction: Decimal) -> String {
    format!("{:.2}%", (fraction * Decimal::from(100)).round_dp(2))
}

/// annual rate as a two-place percentage figure, `4.55` or `4.00`
pub fn format_rate(rate: Rate) -> String {
    format_grouped(rate.as_percentage())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// two decimal places with thousands separators
pub fn format_grouped(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let grouped = add_thousands_separator(&digits);
    if rounded < Decimal::ZERO {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn add_thousands_separator(s: &str) -> String {
    let (integer_part, decimal_part) = match s.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (s, None),
    };

    let chars: Vec<char> = integer_part.chars().rev().collect();
    let formatted: String = chars
        .chunks(3)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(",")
        .chars()
        .rev()
        .collect();

    match decimal_part {
        Some(dec) => format!("{}.{}", formatted, dec),
        None => formatted,
    }
}

/// parse a day-first date (`15/11/2024` or `15-11-2024`)
pub fn parse_day_first_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// parse a currency-formatted amount by keeping only digits, `.` and `-`
///
/// `£1,234.56` -> `1234.56`. Returns `None` when nothing numeric remains.
pub fn parse_currency(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
