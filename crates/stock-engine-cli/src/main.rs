mod report;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use stock_engine_core::engine::{EngineConfig, IndicatorEngine};
use stock_engine_core::series::PriceSeries;
use stock_engine_core::session::Session;
use stock_engine_providers::advisor::{Advisor, advice_prompt, fallback_advice};
use stock_engine_providers::cache::CachedHistory;
use stock_engine_providers::error::ProviderError;
use stock_engine_providers::gemini::GeminiAdvisor;
use stock_engine_providers::provider::HistoryProvider;
use stock_engine_providers::telegram::{Notifier, TelegramNotifier};
use stock_engine_providers::yahoo::YahooProvider;
use tracing::{info, warn};

use crate::report::ScanRow;

/// The fixed NSE watchlist scanned when no symbols are given.
const WATCHLIST: [&str; 10] = [
    "HAL.NS",
    "BEL.NS",
    "SBIN.NS",
    "RELIANCE.NS",
    "NTPC.NS",
    "INFY.NS",
    "TATASTEEL.NS",
    "ITC.NS",
    "HDFCBANK.NS",
    "BHARTIARTL.NS",
];

#[derive(Parser)]
#[command(
    name = "stock-engine",
    about = "Scan a stock watchlist and send morning alerts"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch history, compute indicators and render the watchlist table
    Scan {
        /// Symbols to scan (comma-separated, defaults to the built-in watchlist)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,

        /// Days of daily history to request per symbol
        #[arg(long, default_value_t = 100)]
        lookback_days: u32,

        /// Seconds a fetched series stays fresh in the in-memory cache
        #[arg(long, default_value_t = 300)]
        cache_ttl_secs: u64,

        /// ATR multiplier for the stop-loss
        #[arg(long, default_value = "1.8")]
        stop_multiplier: Decimal,

        /// Skip the AI verdict column
        #[arg(long)]
        no_advice: bool,
    },

    /// Send the morning watchlist report to Telegram
    Alert {
        /// Symbols to report (comma-separated, defaults to the built-in watchlist)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,

        /// Days of daily history to request per symbol
        #[arg(long, default_value_t = 100)]
        lookback_days: u32,

        /// Dashboard link included in the report
        #[arg(long, default_value = "https://stock-engine.example.com")]
        dashboard_url: String,
    },
}

fn watchlist_or(symbols: Option<Vec<String>>) -> Vec<String> {
    match symbols {
        Some(list) if !list.is_empty() => list.iter().map(|s| s.to_uppercase()).collect(),
        _ => WATCHLIST.iter().map(|s| s.to_string()).collect(),
    }
}

/// One fetch, retried once if the provider asks us to back off.
async fn fetch_history(
    provider: &impl HistoryProvider,
    symbol: &str,
    lookback_days: u32,
) -> Result<PriceSeries, ProviderError> {
    match provider.fetch_history(symbol, lookback_days).await {
        Err(ProviderError::RateLimited { retry_after_secs }) => {
            warn!("{symbol}: rate limited, retrying in {retry_after_secs}s");
            tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
            provider.fetch_history(symbol, lookback_days).await
        }
        other => other,
    }
}

async fn cmd_scan(
    symbols: Vec<String>,
    lookback_days: u32,
    cache_ttl_secs: u64,
    stop_multiplier: Decimal,
    no_advice: bool,
) -> Result<()> {
    let provider = CachedHistory::new(YahooProvider::new(), Duration::from_secs(cache_ttl_secs));
    let engine = IndicatorEngine::new(EngineConfig {
        stop_loss_multiplier: stop_multiplier,
    });
    let advisor = if no_advice {
        None
    } else {
        match GeminiAdvisor::from_env() {
            Ok(a) => Some(a),
            Err(e) => {
                warn!("advisor disabled: {e}");
                None
            }
        }
    };

    match Session::classify(&chrono::Utc::now()) {
        Some(session) => info!("NSE session: {session:?}"),
        None => info!("NSE market closed"),
    }

    let mut rows = Vec::new();
    for symbol in &symbols {
        let series = match fetch_history(&provider, symbol, lookback_days).await {
            Ok(series) => series,
            Err(e) => {
                warn!("{symbol}: fetch failed, dropped from results: {e}");
                continue;
            }
        };

        let snapshot = match engine.evaluate(&series) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                warn!(
                    "{symbol}: insufficient history ({} bar(s)), dropped from results",
                    series.len()
                );
                continue;
            }
            Err(e) => {
                warn!("{symbol}: dropped from results: {e}");
                continue;
            }
        };

        let advice = match &advisor {
            Some(advisor) => match advisor.generate(&advice_prompt(symbol, &snapshot)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("{symbol}: {} failed, using fallback: {e}", advisor.name());
                    fallback_advice(snapshot.trend)
                }
            },
            None => fallback_advice(snapshot.trend),
        };

        rows.push(ScanRow {
            symbol: symbol.clone(),
            snapshot,
            advice,
        });
    }

    if rows.is_empty() {
        println!("No data found. Check the ticker symbols or try again later.");
        return Ok(());
    }

    print!("{}", report::scan_table(&rows));
    Ok(())
}

async fn cmd_alert(
    symbols: Vec<String>,
    lookback_days: u32,
    dashboard_url: &str,
) -> Result<()> {
    let notifier = TelegramNotifier::from_env().context("failed to create Telegram notifier")?;
    let provider = YahooProvider::new();
    let engine = IndicatorEngine::default();

    let mut rows = Vec::new();
    for symbol in &symbols {
        let series = match fetch_history(&provider, symbol, lookback_days).await {
            Ok(series) => series,
            Err(e) => {
                warn!("{symbol}: fetch failed, skipped in report: {e}");
                continue;
            }
        };
        match engine.evaluate(&series) {
            Ok(Some(snapshot)) => rows.push((symbol.clone(), snapshot)),
            Ok(None) => warn!("{symbol}: insufficient history, skipped in report"),
            Err(e) => warn!("{symbol}: skipped in report: {e}"),
        }
    }

    let text = report::morning_report(&rows, dashboard_url);
    notifier
        .send(&text)
        .await
        .context("failed to send Telegram report")?;
    info!("morning report sent, {} symbol(s)", rows.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Scan {
            symbols,
            lookback_days,
            cache_ttl_secs,
            stop_multiplier,
            no_advice,
        } => {
            cmd_scan(
                watchlist_or(symbols),
                lookback_days,
                cache_ttl_secs,
                stop_multiplier,
                no_advice,
            )
            .await?;
        }
        Commands::Alert {
            symbols,
            lookback_days,
            dashboard_url,
        } => {
            cmd_alert(watchlist_or(symbols), lookback_days, &dashboard_url).await?;
        }
    }

    Ok(())
}
