//! Pure indicator math over daily bars. Every function returns `Option` so
//! callers are forced to handle insufficient history. None of them round;
//! rounding happens at display time only.

use rust_decimal::Decimal;

use crate::bar::PriceBar;

/// Simple moving average of the last `period` closes.
pub fn sma(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    let sum: Decimal = window.iter().copied().sum();
    Some(sum / Decimal::from(period as u64))
}

/// Relative Strength Index via Wilder smoothing.
///
/// The average gain and loss are seeded with the plain mean of the first
/// `period` one-day changes, then smoothed with factor `1/period` across the
/// rest of the series. Needs at least `period + 1` closes (one prior bar
/// beyond the window to seed the changes). When the average loss is zero the
/// RSI is exactly 100: no losses occurred, including the all-flat case.
pub fn rsi(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let period_d = Decimal::from(period as u64);

    let mut avg_gain: Decimal = deltas[..period]
        .iter()
        .filter(|d| **d > Decimal::ZERO)
        .copied()
        .sum::<Decimal>()
        / period_d;
    let mut avg_loss: Decimal = deltas[..period]
        .iter()
        .filter(|d| **d < Decimal::ZERO)
        .map(|d| d.abs())
        .sum::<Decimal>()
        / period_d;

    for delta in &deltas[period..] {
        let (gain, loss) = if *delta > Decimal::ZERO {
            (*delta, Decimal::ZERO)
        } else {
            (Decimal::ZERO, delta.abs())
        };
        avg_gain = (avg_gain * (period_d - Decimal::ONE) + gain) / period_d;
        avg_loss = (avg_loss * (period_d - Decimal::ONE) + loss) / period_d;
    }

    if avg_loss.is_zero() {
        return Some(Decimal::ONE_HUNDRED);
    }
    let rs = avg_gain / avg_loss;
    Some(Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + rs))
}

/// Average True Range via Wilder smoothing.
///
/// True Range per bar is `max(high - low, |high - prevClose|, |low - prevClose|)`,
/// so `period` TR values need `period + 1` bars.
pub fn atr(bars: &[PriceBar], period: usize) -> Option<Decimal> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let true_ranges: Vec<Decimal> = bars
        .windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let hl = w[1].high - w[1].low;
            let hc = (w[1].high - prev_close).abs();
            let lc = (w[1].low - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let period_d = Decimal::from(period as u64);
    let mut atr = true_ranges[..period].iter().copied().sum::<Decimal>() / period_d;
    for tr in &true_ranges[period..] {
        atr = (atr * (period_d - Decimal::ONE) + *tr) / period_d;
    }
    Some(atr)
}

/// Percentage change of the latest close versus the prior close.
pub fn day_change_pct(closes: &[Decimal]) -> Option<Decimal> {
    if closes.len() < 2 {
        return None;
    }
    let last = closes[closes.len() - 1];
    let prev = closes[closes.len() - 2];
    if prev.is_zero() {
        return None;
    }
    Some((last - prev) / prev * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn closes(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    fn flat_bar(day: u32, close: Decimal, range: Decimal) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(day as i64),
            open: close,
            high: close + range / dec!(2),
            low: close - range / dec!(2),
            close,
            volume: 1000,
        }
    }

    #[test]
    fn sma_of_last_window() {
        let c = closes(&[1, 2, 3, 4, 5]);
        assert_eq!(sma(&c, 3), Some(dec!(4)));
    }

    #[test]
    fn sma_insufficient_data() {
        assert_eq!(sma(&closes(&[1, 2]), 3), None);
        assert_eq!(sma(&[], 1), None);
    }

    #[test]
    fn sma_period_zero() {
        assert_eq!(sma(&closes(&[1, 2, 3]), 0), None);
    }

    #[test]
    fn rsi_needs_period_plus_one_closes() {
        // 14 closes give only 13 deltas.
        let c: Vec<Decimal> = (1..=14).map(Decimal::from).collect();
        assert_eq!(rsi(&c, 14), None);
    }

    #[test]
    fn rsi_flat_series_is_100() {
        // No losses occurred, so the zero-average-loss branch applies.
        let c = vec![dec!(50); 15];
        assert_eq!(rsi(&c, 14), Some(dec!(100)));
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let c: Vec<Decimal> = (100..=119).map(Decimal::from).collect();
        assert_eq!(rsi(&c, 14), Some(dec!(100)));
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let c: Vec<Decimal> = (100..=119).rev().map(Decimal::from).collect();
        assert_eq!(rsi(&c, 14), Some(dec!(0)));
    }

    #[test]
    fn rsi_mixed_series_between_bounds() {
        // Alternating up 2 / down 1 keeps both averages positive.
        let mut c = vec![dec!(100)];
        for i in 0..20 {
            let prev = *c.last().unwrap();
            c.push(if i % 2 == 0 { prev + dec!(2) } else { prev - dec!(1) });
        }
        let value = rsi(&c, 14).unwrap();
        assert!(value > dec!(0) && value < dec!(100));
        assert!(value > dec!(50), "more gains than losses, got {value}");
    }

    #[test]
    fn atr_constant_range_no_gaps() {
        // Flat closes with a constant 2-point bar range: every TR is 2.
        let bars: Vec<PriceBar> = (0..15).map(|d| flat_bar(d, dec!(100), dec!(2))).collect();
        assert_eq!(atr(&bars, 14), Some(dec!(2)));
    }

    #[test]
    fn atr_uses_gap_over_bar_range() {
        // A gap up makes |high - prevClose| the dominant term.
        let mut bars: Vec<PriceBar> = (0..14).map(|d| flat_bar(d, dec!(100), dec!(2))).collect();
        bars.push(flat_bar(14, dec!(110), dec!(2)));
        let value = atr(&bars, 14).unwrap();
        assert!(value > dec!(2), "gap should raise ATR, got {value}");
    }

    #[test]
    fn atr_insufficient_data() {
        let bars: Vec<PriceBar> = (0..14).map(|d| flat_bar(d, dec!(100), dec!(2))).collect();
        assert_eq!(atr(&bars, 14), None);
    }

    #[test]
    fn day_change_pct_basic() {
        assert_eq!(day_change_pct(&closes(&[100, 110])), Some(dec!(10)));
        assert_eq!(day_change_pct(&closes(&[100, 95])), Some(dec!(-5)));
    }

    #[test]
    fn day_change_pct_single_close() {
        assert_eq!(day_change_pct(&closes(&[100])), None);
    }
}
