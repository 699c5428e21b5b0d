//! Display formatting
//!
//! German number formatting for the presenter and admin views: `.` groups
//! thousands, `,` separates cents, always two decimals (`1.234.567,89`).

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Timestamp format used in listings and exports
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Format a decimal as `1.234.567,89`.
pub fn format_german(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (integer, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{sign}{grouped},{cents}")
}

/// Format a decimal as a euro amount: `1.234,50 €`.
pub fn format_euro(value: Decimal) -> String {
    format!("{} €", format_german(value))
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_german_grouping() {
        assert_eq!(format_german(dec!(1234567.89)), "1.234.567,89");
        assert_eq!(format_german(dec!(123456.7)), "123.456,70");
        assert_eq!(format_german(dec!(1000)), "1.000,00");
        assert_eq!(format_german(dec!(999)), "999,00");
    }

    #[test]
    fn test_format_german_small_values() {
        assert_eq!(format_german(Decimal::ZERO), "0,00");
        assert_eq!(format_german(dec!(0.5)), "0,50");
        assert_eq!(format_german(dec!(0.125)), "0,13");
    }

    #[test]
    fn test_format_german_negative() {
        assert_eq!(format_german(dec!(-1234.5)), "-1.234,50");
    }

    #[test]
    fn test_format_euro() {
        assert_eq!(format_euro(dec!(3500)), "3.500,00 €");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(format_timestamp(&ts), "05.03.2026 14:07:09");
    }
}
