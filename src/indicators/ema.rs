// =============================================================================
// Exponential Moving Average (EMA) and Triple EMA (TEMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// TEMA removes most of the lag of a single EMA at the cost of overshoot on
// sharp reversals:
//   TEMA = 3 * EMA1 - 3 * EMA2 + EMA3
//   EMA2 = EMA(EMA1), EMA3 = EMA(EMA2), all at the same period.
// =============================================================================

/// Exponential smoothing with factor `alpha`, seeded by the first value.
///
/// Shared by EMA (`alpha = 2 / (n + 1)`) and Wilder's smoothing
/// (`alpha = 1 / n`). The output has the same length as the input.
pub fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return result;
    };
    result.push(first);

    let mut prev = first;
    for &value in iter {
        prev = value * alpha + prev * (1.0 - alpha);
        result.push(prev);
    }
    result
}

/// EMA series aligned 1:1 with `closes`.
///
/// Returns an empty `Vec` when `period == 0`.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    smooth(closes, 2.0 / (period as f64 + 1.0))
}

/// TEMA series aligned 1:1 with `closes`.
pub fn calculate_tema(closes: &[f64], period: usize) -> Vec<f64> {
    let ema1 = calculate_ema(closes, period);
    let ema2 = calculate_ema(&ema1, period);
    let ema3 = calculate_ema(&ema2, period);

    ema1.iter()
        .zip(&ema2)
        .zip(&ema3)
        .map(|((e1, e2), e3)| 3.0 * e1 - 3.0 * e2 + e3)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_seeded_by_first_value() {
        let ema = calculate_ema(&[10.0, 20.0], 3);
        assert_eq!(ema.len(), 2);
        assert_eq!(ema[0], 10.0);
        // multiplier = 0.5
        assert!((ema[1] - 15.0).abs() < 1e-12);
    }

    #[test]
    fn ema_known_values() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), closes.len());

        let mult = 2.0 / 6.0;
        let mut expected = closes[0];
        for (i, &c) in closes.iter().enumerate().skip(1) {
            expected = c * mult + expected * (1.0 - mult);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}: got {}, expected {expected}", ema[i]);
        }
    }

    #[test]
    fn ema_short_series_is_tolerated() {
        // Fewer values than the period still yields a defined series.
        let ema = calculate_ema(&[1.0, 2.0], 200);
        assert_eq!(ema.len(), 2);
        assert!(ema.iter().all(|v| v.is_finite()));
    }

    // ---- calculate_tema --------------------------------------------------

    #[test]
    fn tema_of_constant_series_is_constant() {
        let closes = vec![42.0; 300];
        for period in [8, 21, 55] {
            let tema = calculate_tema(&closes, period);
            assert_eq!(tema.len(), 300);
            assert!((tema[299] - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn tema_converges_after_level_shift() {
        let mut closes = vec![10.0; 50];
        closes.extend(std::iter::repeat(20.0).take(400));
        let tema = calculate_tema(&closes, 21);
        assert!((tema.last().unwrap() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn tema_lags_less_than_ema_on_a_ramp() {
        let closes: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let ema = calculate_ema(&closes, 20);
        let tema = calculate_tema(&closes, 20);
        let last = closes[199];
        assert!((last - tema[199]).abs() < (last - ema[199]).abs());
    }
}
