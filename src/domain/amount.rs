//! Amount type
//!
//! Domain primitive for submitted estimates. All amounts are validated at
//! construction time, so an invalid estimate never reaches the store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum accepted estimate (1 trillion)
const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Currency precision (cents)
const SCALE: u32 = 2;

/// Amount represents a validated, non-negative currency value.
///
/// # Invariants
/// - Value is zero or positive
/// - At most 2 decimal places (stored rescaled to exactly 2)
/// - Maximum value is 1 trillion
///
/// # Example
/// ```
/// use live_survey::domain::Amount;
///
/// let amount: Amount = "1234.5".parse().unwrap();
/// assert_eq!(amount.to_string(), "1234.50");
/// assert_eq!(amount.to_minor_units(), 123450);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max {SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::Negative` if value < 0
    /// - `AmountError::TooManyDecimals` if more than 2 significant decimal places
    /// - `AmountError::Overflow` if value > 1 trillion
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }

        // "1.500" is fine, "1.505" is not
        let normalized = value.normalize();
        if normalized.scale() > SCALE {
            return Err(AmountError::TooManyDecimals(normalized.scale()));
        }

        if normalized > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }

        let mut value = if normalized.is_zero() {
            Decimal::ZERO
        } else {
            normalized
        };
        value.rescale(SCALE);

        Ok(Self(value))
    }

    /// The amount in cents, as persisted.
    pub fn to_minor_units(&self) -> i64 {
        // scale is always SCALE and the value is bounded by MAX_AMOUNT,
        // so the mantissa is the cent count and fits in an i64
        self.0.mantissa() as i64
    }
}

/// Convert persisted cents back into a decimal with currency scale.
pub fn decimal_from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::from_str(&value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}
