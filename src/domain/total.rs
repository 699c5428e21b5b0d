//! Running total
//!
//! The singleton aggregate and the read-time share derived from it.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default share shown next to the total (percent)
pub const DEFAULT_SHARE_PERCENT: Decimal = Decimal::TEN;

/// The persisted running total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotal {
    pub current_total: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// A total together with its derived share, as shown to presenters and admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalSnapshot {
    pub total: Decimal,
    pub share: Decimal,
    pub share_percent: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl TotalSnapshot {
    pub fn new(aggregate: AggregateTotal, share_percent: Decimal) -> Self {
        Self {
            total: aggregate.current_total,
            share: share_of(aggregate.current_total, share_percent),
            share_percent,
            last_updated: aggregate.last_updated,
        }
    }
}

/// `percent` percent of `total`, rounded to cents (half away from zero).
///
/// Pure and never persisted.
pub fn share_of(total: Decimal, percent: Decimal) -> Decimal {
    (total * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
