use rust_decimal::Decimal;
use stock_engine_core::snapshot::IndicatorSnapshot;

/// One evaluated instrument, ready for display.
pub struct ScanRow {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    pub advice: String,
}

fn fmt_opt(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Fixed-width table with one row per evaluated instrument.
/// Instruments that yielded no data are simply not in `rows`.
pub fn scan_table(rows: &[ScanRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:>10} {:>8} {:>8}  {:<8} {:>10}  {}\n",
        "SYMBOL", "PRICE", "CHG%", "RSI", "TREND", "STOP", "ADVICE"
    ));
    for row in rows {
        let s = row.snapshot.rounded();
        out.push_str(&format!(
            "{:<14} {:>10} {:>8} {:>8}  {:<8} {:>10}  {}\n",
            row.symbol,
            format!("{:.2}", s.price),
            fmt_opt(s.day_change_pct),
            fmt_opt(s.rsi_14),
            s.trend.to_string(),
            fmt_opt(s.stop_loss),
            row.advice,
        ));
    }
    out
}

/// The Markdown morning report for the Telegram chat.
pub fn morning_report(rows: &[(String, IndicatorSnapshot)], dashboard_url: &str) -> String {
    let mut report = String::from("🚀 *MORNING ENGINE REPORT*\n");
    report.push_str("----------------------------\n");

    for (symbol, snapshot) in rows {
        let name = symbol.strip_suffix(".NS").unwrap_or(symbol);
        let s = snapshot.rounded();
        report.push_str(&format!("✅ *{name}*: ₹{:.2} ({})\n", s.price, s.trend));
    }

    report.push_str(&format!("\n📊 [Open Your Dashboard]({dashboard_url})\n"));
    report.push_str("⚠️ *Action:* Check SL & Qty on Dashboard at 9:25 AM.");
    report
}
