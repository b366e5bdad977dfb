use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use stock_engine_core::bar::PriceBar;
use stock_engine_core::series::PriceSeries;
use tracing::debug;

use crate::error::ProviderError;
use crate::provider::HistoryProvider;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance daily-history provider.
/// No authentication required; a browser user agent keeps the endpoint from
/// rejecting the request.
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_CHART_URL.to_string())
    }

    /// Create with a custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("Mozilla/5.0")
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("failed to build reqwest client"),
            base_url,
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ProviderError> {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(lookback_days));

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, symbol))
            .query(&[
                ("period1", &start.timestamp().to_string()),
                ("period2", &end.timestamp().to_string()),
                ("interval", &"1d".to_string()),
            ])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status,
                message: body,
            });
        }

        let body: YahooResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("failed to parse response: {e}")))?;

        if let Some(error) = body.chart.error {
            return Err(ProviderError::Api {
                status: 0,
                message: format!("{}: {}", error.code, error.description),
            });
        }

        let results = body
            .chart
            .result
            .ok_or_else(|| ProviderError::Parse("no results in response".into()))?;

        if results.is_empty() {
            return Ok(PriceSeries::new(symbol, Vec::new()));
        }

        let bars = parse_yahoo_result(&results[0])?;
        debug!("{symbol}: fetched {} daily bar(s)", bars.len());
        Ok(PriceSeries::new(symbol, bars))
    }
}

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<i64>>,
}

fn f64_to_decimal(val: f64) -> Result<Decimal, ProviderError> {
    Decimal::try_from(val).map_err(|e| ProviderError::Parse(format!("invalid decimal value: {e}")))
}

/// Convert one chart result into ordered daily bars.
/// Bars with any null field are skipped; when the feed repeats a date (the
/// live bar is sometimes appended next to the settled one) the last
/// occurrence wins.
fn parse_yahoo_result(result: &YahooResult) -> Result<Vec<PriceBar>, ProviderError> {
    let timestamps = result
        .timestamp
        .as_ref()
        .ok_or_else(|| ProviderError::Parse("missing timestamps".into()))?;

    if result.indicators.quote.is_empty() {
        return Ok(Vec::new());
    }

    let quote = &result.indicators.quote[0];
    let mut bars: Vec<PriceBar> = Vec::new();

    for (i, &ts) in timestamps.iter().enumerate() {
        let open = match quote.open.get(i).copied().flatten() {
            Some(v) => f64_to_decimal(v)?,
            None => continue, // skip bars with missing data
        };
        let high = match quote.high.get(i).copied().flatten() {
            Some(v) => f64_to_decimal(v)?,
            None => continue,
        };
        let low = match quote.low.get(i).copied().flatten() {
            Some(v) => f64_to_decimal(v)?,
            None => continue,
        };
        let close = match quote.close.get(i).copied().flatten() {
            Some(v) => f64_to_decimal(v)?,
            None => continue,
        };
        let volume = quote.volume.get(i).copied().flatten().unwrap_or(0);

        let date = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| ProviderError::Parse(format!("invalid unix timestamp: {ts}")))?
            .date_naive();

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    // Stable sort, then keep the later occurrence of each date.
    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if deduped.last().is_some_and(|prev| prev.date == bar.date) {
            *deduped.last_mut().unwrap() = bar;
        } else {
            deduped.push(bar);
        }
    }
    Ok(deduped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_daily_response_json() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736899200, 1736985600, 1737072000],
                    "indicators": {
                        "quote": [{
                            "open": [4280.00, 4305.50, 4290.10],
                            "high": [4320.00, 4340.00, 4315.00],
                            "low": [4270.00, 4295.00, 4260.00],
                            "close": [4305.50, 4312.20, 4280.75],
                            "volume": [1200000, 980000, 1500000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let results = response.chart.result.unwrap();
        let bars = parse_yahoo_result(&results[0]).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].volume, 1200000);
        assert!(bars[0].close > dec!(4305.0) && bars[0].close < dec!(4306.0));
        // Consecutive trading days, strictly increasing
        assert!(bars[0].date < bars[1].date && bars[1].date < bars[2].date);
    }

    #[test]
    fn parse_response_with_null_values() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736899200, 1736985600, 1737072000],
                    "indicators": {
                        "quote": [{
                            "open": [4280.00, null, 4290.10],
                            "high": [4320.00, null, 4315.00],
                            "low": [4270.00, null, 4260.00],
                            "close": [4305.50, null, 4280.75],
                            "volume": [1200000, null, 1500000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let results = response.chart.result.unwrap();
        let bars = parse_yahoo_result(&results[0]).unwrap();

        // The null bar should be skipped
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn parse_duplicate_date_keeps_last() {
        // Yahoo sometimes appends the live bar next to the settled daily bar:
        // same calendar date, two timestamps a few hours apart.
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736899200, 1736915400],
                    "indicators": {
                        "quote": [{
                            "open": [4280.00, 4280.00],
                            "high": [4320.00, 4335.00],
                            "low": [4270.00, 4270.00],
                            "close": [4305.50, 4331.00],
                            "volume": [1200000, 1650000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let results = response.chart.result.unwrap();
        let bars = parse_yahoo_result(&results[0]).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, dec!(4331.00));
        assert_eq!(bars[0].volume, 1650000);
    }

    #[test]
    fn parse_error_response() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        assert!(response.chart.error.is_some());
        assert_eq!(response.chart.error.as_ref().unwrap().code, "Not Found");
    }

    #[test]
    fn parsed_series_passes_validation() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1736899200, 1736985600],
                    "indicators": {
                        "quote": [{
                            "open": [100.0, 101.0],
                            "high": [102.0, 103.0],
                            "low": [99.0, 100.0],
                            "close": [101.0, 102.0],
                            "volume": [1000, 2000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let results = response.chart.result.unwrap();
        let bars = parse_yahoo_result(&results[0]).unwrap();
        let series = PriceSeries::new("SBIN.NS", bars);
        assert!(series.validate().is_ok());
    }

    #[test]
    fn f64_to_decimal_converts() {
        let result = f64_to_decimal(4305.50).unwrap();
        assert!(result > dec!(4305.0) && result < dec!(4306.0));
    }
}
