use rust_decimal::Decimal;

use crate::error::DataQualityError;
use crate::indicators;
use crate::series::PriceSeries;
use crate::snapshot::{IndicatorSnapshot, Trend};

pub const MA_PERIOD: usize = 20;
pub const RSI_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;

/// Engine tunables. The indicator periods are fixed; only the stop-loss
/// multiplier varies.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// `k` in `stop_loss = price - k * atr14`.
    pub stop_loss_multiplier: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // 1.8
            stop_loss_multiplier: Decimal::new(18, 1),
        }
    }
}

/// Turns one price series into an [`IndicatorSnapshot`]. Pure and
/// deterministic: no I/O, no hidden state, safe to run per-instrument in any
/// order or in parallel.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: EngineConfig,
}

impl IndicatorEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Evaluate one series.
    ///
    /// `Ok(None)` means insufficient history (fewer than [`MA_PERIOD`] bars),
    /// a valid empty result rather than an error: the whole evaluation is
    /// abandoned instead of returning a partial snapshot. Malformed input is
    /// rejected up front with a [`DataQualityError`].
    pub fn evaluate(
        &self,
        series: &PriceSeries,
    ) -> Result<Option<IndicatorSnapshot>, DataQualityError> {
        series.validate()?;
        if series.len() < MA_PERIOD {
            return Ok(None);
        }

        let closes = series.closes();
        let price = closes[closes.len() - 1];
        let Some(moving_average_20) = indicators::sma(&closes, MA_PERIOD) else {
            return Ok(None);
        };

        // Strict comparison on the raw values; ties classify as bearish.
        let trend = if price > moving_average_20 {
            Trend::Bullish
        } else {
            Trend::Bearish
        };

        let atr_14 = indicators::atr(&series.bars, ATR_PERIOD);
        let stop_loss = atr_14.map(|atr| price - self.config.stop_loss_multiplier * atr);

        Ok(Some(IndicatorSnapshot {
            price,
            moving_average_20,
            rsi_14: indicators::rsi(&closes, RSI_PERIOD),
            day_change_pct: indicators::day_change_pct(&closes),
            atr_14,
            stop_loss,
            trend,
        }))
    }
}
