use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use stock_engine_core::series::PriceSeries;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::HistoryProvider;

/// TTL cache in front of a [`HistoryProvider`].
///
/// A scan cycle fetches every watchlist symbol fresh; re-running within the
/// TTL window reuses the previous response instead of hammering the upstream
/// provider. Entries are keyed by symbol and lookback so a longer request is
/// never served from a shorter one. Nothing persists across process runs.
pub struct CachedHistory<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<(String, u32), CacheEntry>>,
}

struct CacheEntry {
    fetched_at: Instant,
    series: PriceSeries,
}

impl<P> CachedHistory<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<P: HistoryProvider> HistoryProvider for CachedHistory<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ProviderError> {
        let key = (symbol.to_string(), lookback_days);

        {
            let entries = self.entries.lock().expect("cache lock poisoned");
            if let Some(entry) = entries.get(&key) {
                if entry.fetched_at.elapsed() < self.ttl {
                    debug!("{symbol}: serving {lookback_days}d history from cache");
                    return Ok(entry.series.clone());
                }
            }
        }

        let series = self.inner.fetch_history(symbol, lookback_days).await?;

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                series: series.clone(),
            },
        );
        Ok(series)
    }
}
