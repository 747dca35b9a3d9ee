// =============================================================================
// Bar — a single OHLCV period plus series hygiene helpers
// =============================================================================
//
// A fetched series always ends with the bar that is still forming. Every
// computation downstream works on closed bars only, so the forming bar is
// dropped before any indicator runs.
// =============================================================================

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One OHLCV bar. `timestamp` is the bar open time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar open time as a UTC datetime.
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Enforce the series invariants on freshly fetched bars: strictly increasing
/// timestamps (out-of-order and duplicate bars are dropped) and finite prices.
///
/// A non-finite OHLC value fails the whole series; the caller treats that the
/// same as an unavailable upstream.
pub fn normalize(bars: Vec<Bar>) -> Result<Vec<Bar>> {
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if !bar.is_finite() {
            anyhow::bail!("bar at {} carries a non-finite price", bar.timestamp);
        }
        if let Some(last) = out.last() {
            if bar.timestamp <= last.timestamp {
                warn!(
                    timestamp = bar.timestamp,
                    previous = last.timestamp,
                    "dropping out-of-order or duplicate bar"
                );
                continue;
            }
        }
        out.push(bar);
    }
    Ok(out)
}

/// Drop the forming bar, returning the closed portion of the series.
pub fn closed_bars(bars: &[Bar]) -> &[Bar] {
    match bars.split_last() {
        Some((_, closed)) => closed,
        None => bars,
    }
}

/// Keep only the most recent `limit` bars.
pub fn tail(mut bars: Vec<Bar>, limit: usize) -> Vec<Bar> {
    if bars.len() > limit {
        bars.drain(..bars.len() - limit);
    }
    bars
}

/// Column views used by the indicator library.
pub struct Columns {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl Columns {
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar::new(ts, close, close + 1.0, close - 1.0, close, 10.0)
    }

    #[test]
    fn normalize_drops_duplicates_and_out_of_order() {
        let bars = vec![bar(1, 10.0), bar(2, 11.0), bar(2, 99.0), bar(1, 98.0), bar(3, 12.0)];
        let out = normalize(bars).unwrap();
        let ts: Vec<i64> = out.iter().map(|b| b.timestamp).collect();
        assert_eq!(ts, vec![1, 2, 3]);
        assert_eq!(out[1].close, 11.0);
    }

    #[test]
    fn normalize_rejects_nan() {
        let bars = vec![bar(1, 10.0), bar(2, f64::NAN)];
        assert!(normalize(bars).is_err());
    }

    #[test]
    fn closed_bars_discards_forming_bar() {
        let bars = vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)];
        let closed = closed_bars(&bars);
        assert_eq!(closed.len(), 2);
        assert_eq!(closed.last().unwrap().timestamp, 2);
        assert!(closed_bars(&[]).is_empty());
    }

    #[test]
    fn open_time_converts_epoch_millis() {
        let t = bar(1_700_000_000_000, 1.0).open_time().unwrap();
        assert_eq!(t.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn tail_keeps_most_recent() {
        let bars: Vec<Bar> = (0..10).map(|i| bar(i, i as f64)).collect();
        let out = tail(bars, 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].timestamp, 6);
        assert_eq!(tail(out, 100).len(), 4);
    }
}
