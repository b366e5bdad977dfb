use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bar::PriceBar;
use crate::error::DataQualityError;

/// Chronologically ordered daily bars for a single instrument.
/// May be shorter than the requested lookback if the provider has gaps or the
/// instrument is newly listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Check the series invariants: strictly increasing dates, positive
    /// closes, `low <= high` on every bar.
    pub fn validate(&self) -> Result<(), DataQualityError> {
        for (i, bar) in self.bars.iter().enumerate() {
            if i > 0 && bar.date <= self.bars[i - 1].date {
                return Err(DataQualityError::OutOfOrderDates {
                    symbol: self.symbol.clone(),
                    date: bar.date,
                });
            }
            if bar.close <= Decimal::ZERO {
                return Err(DataQualityError::NonPositiveClose {
                    symbol: self.symbol.clone(),
                    date: bar.date,
                });
            }
            if bar.low > bar.high {
                return Err(DataQualityError::InvertedRange {
                    symbol: self.symbol.clone(),
                    date: bar.date,
                });
            }
        }
        Ok(())
    }
}
