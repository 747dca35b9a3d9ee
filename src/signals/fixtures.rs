// Synthetic series shared by engine and scanner tests.

use crate::market_data::Bar;

pub const HOUR_MS: i64 = 3_600_000;

/// Hourly bars with a 0.4% high/low band around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(i as i64 * HOUR_MS, c, c * 1.002, c * 0.998, c, 1_000.0))
        .collect()
}

/// 301 closes: 0.4%/bar decline through bar 249, then a rally accelerating
/// by 0.1%/bar. On the "1hr" timeframe the selected TEMAs cross exactly
/// once, upwards, at bar 250.
pub fn reversal_closes() -> Vec<f64> {
    let mut closes = vec![100.0];
    let mut growth = 0.004;
    for i in 1..301 {
        let rate = if i <= 249 {
            -0.004
        } else {
            let r = growth;
            growth += 0.001;
            r
        };
        let last = closes[i - 1];
        closes.push(last * (1.0 + rate));
    }
    closes
}

/// Bars 0..=250 closed plus a forming bar: LONG on the latest closed bar.
pub fn long_signal_bars() -> Vec<Bar> {
    let mut bars = bars_from_closes(&reversal_closes());
    bars.truncate(252);
    bars
}
