// =============================================================================
// Crossover Angle
// =============================================================================
//
//   fast_slope = (fast_t - fast_{t-3}) / 3
//   slow_slope = (slow_t - slow_{t-3}) / 3
//   angle      = atan(100 * (fast_slope - slow_slope) / close_t)  [degrees]
//
// Normalising by price makes the angle comparable across instruments.

/// Bars between the two points of each slope.
pub const ANGLE_LOOKBACK: usize = 3;

/// Angle at the last bar, rounded to 2 decimals. `None` with too little
/// history or a non-finite result.
pub fn crossover_angle(fast: &[f64], slow: &[f64], closes: &[f64]) -> Option<f64> {
    let n = fast.len().min(slow.len()).min(closes.len());
    if n <= ANGLE_LOOKBACK + 1 {
        return None;
    }
    let last = n - 1;
    let prev = last - ANGLE_LOOKBACK;

    let fast_slope = (fast[last] - fast[prev]) / ANGLE_LOOKBACK as f64;
    let slow_slope = (slow[last] - slow[prev]) / ANGLE_LOOKBACK as f64;
    let diff = (fast_slope - slow_slope) / closes[last];
    let degrees = (diff * 100.0).atan().to_degrees();

    degrees
        .is_finite()
        .then(|| (degrees * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_lines_have_zero_angle() {
        let fast: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let slow: Vec<f64> = (0..10).map(|i| 5.0 + i as f64).collect();
        let closes = vec![100.0; 10];
        assert_eq!(crossover_angle(&fast, &slow, &closes), Some(0.0));
    }

    #[test]
    fn rising_fast_gives_positive_angle() {
        // fast slope 1/bar, slow flat, price 100 -> atan(1) = 45 degrees
        let fast: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let slow = vec![5.0; 10];
        let closes = vec![100.0; 10];
        assert_eq!(crossover_angle(&fast, &slow, &closes), Some(45.0));
    }

    #[test]
    fn short_history_has_no_angle() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(crossover_angle(&s, &s, &s), None);
    }

    #[test]
    fn nan_price_has_no_angle() {
        let fast: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let slow = vec![1.0; 6];
        let mut closes = vec![1.0; 6];
        closes[5] = f64::NAN;
        assert_eq!(crossover_angle(&fast, &slow, &closes), None);
    }
}
