//! Domain module
//!
//! Core domain types: amounts, entries, the running total and its display.

pub mod amount;
pub mod entry;
pub mod format;
pub mod total;

pub use amount::{decimal_from_minor_units, Amount, AmountError};
pub use entry::{ContactDetails, SurveyEntry};
pub use format::{format_euro, format_german, format_timestamp};
pub use total::{share_of, AggregateTotal, TotalSnapshot, DEFAULT_SHARE_PERCENT};
