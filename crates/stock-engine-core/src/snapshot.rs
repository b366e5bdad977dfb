use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Binary classification of price relative to its 20-day moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "BULLISH"),
            Trend::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// Derived metrics for one instrument, computed from exactly one price series
/// at one point in time and discarded after display.
///
/// Values are kept at full precision; comparisons upstream used the raw
/// numbers and presentation calls [`IndicatorSnapshot::rounded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Latest close.
    pub price: Decimal,
    pub moving_average_20: Decimal,
    pub rsi_14: Option<Decimal>,
    pub day_change_pct: Option<Decimal>,
    pub atr_14: Option<Decimal>,
    /// `price - k * atr_14` for the configured multiplier.
    pub stop_loss: Option<Decimal>,
    pub trend: Trend,
}

impl IndicatorSnapshot {
    /// Copy with every value rounded to 2 decimal places for display.
    pub fn rounded(&self) -> Self {
        Self {
            price: self.price.round_dp(2),
            moving_average_20: self.moving_average_20.round_dp(2),
            rsi_14: self.rsi_14.map(|v| v.round_dp(2)),
            day_change_pct: self.day_change_pct.map(|v| v.round_dp(2)),
            atr_14: self.atr_14.map(|v| v.round_dp(2)),
            stop_loss: self.stop_loss.map(|v| v.round_dp(2)),
            trend: self.trend,
        }
    }
}
