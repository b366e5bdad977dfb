use async_trait::async_trait;
use stock_engine_core::snapshot::{IndicatorSnapshot, Trend};

use crate::error::AdvisorError;

/// Trait for generating a one-sentence natural-language trading verdict.
///
/// The text is decoration only: it is never used for control decisions, and a
/// failure here must never block rendering of the numeric snapshot. Callers
/// substitute [`fallback_advice`] instead.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Advisor name (for logging/display).
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// Build the advisor prompt for one evaluated instrument.
/// Numbers are the rounded display values, same as the table shows.
pub fn advice_prompt(symbol: &str, snapshot: &IndicatorSnapshot) -> String {
    let rounded = snapshot.rounded();
    let rsi = rounded
        .rsi_14
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Stock: {symbol}, Price: {}, RSI: {rsi}. \
         Give a 1-sentence trading advice for a retail investor.",
        rounded.price
    )
}

/// Substitute used whenever the advisor is unavailable or fails.
pub fn fallback_advice(trend: Trend) -> String {
    format!("Technicals only: {trend}")
}
