use async_trait::async_trait;
use stock_engine_core::series::PriceSeries;

use crate::error::ProviderError;

/// Trait for fetching daily price history from an external source.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Provider name (for logging/display).
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol covering the last `lookback_days`
    /// calendar days. Returns a chronologically ordered series; it may be
    /// shorter than requested (provider gaps, newly listed instruments) or
    /// empty, which is not an error.
    async fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ProviderError>;
}
