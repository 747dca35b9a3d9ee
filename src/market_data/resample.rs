// =============================================================================
// Resampling — build coarser bars from a finer fetched interval
// =============================================================================
//
// Buckets are aligned to the Unix epoch (every day starts a fresh bucket for
// any bucket length that divides 1440 minutes). Within a bucket:
//   open = first, high = max, low = min, close = last, volume = sum.
// Empty buckets produce no bar.
// =============================================================================

use super::bar::Bar;

/// Aggregate `bars` (oldest first) into `bucket_minutes` bars.
pub fn resample(bars: &[Bar], bucket_minutes: i64) -> Vec<Bar> {
    if bucket_minutes <= 0 {
        return bars.to_vec();
    }
    let bucket_ms = bucket_minutes * 60_000;

    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        let start = bar.timestamp.div_euclid(bucket_ms) * bucket_ms;
        match out.last_mut() {
            Some(current) if current.timestamp == start => {
                current.high = current.high.max(bar.high);
                current.low = current.low.min(bar.low);
                current.close = bar.close;
                current.volume += bar.volume;
            }
            _ => out.push(Bar::new(start, bar.open, bar.high, bar.low, bar.close, bar.volume)),
        }
    }
    out
}
