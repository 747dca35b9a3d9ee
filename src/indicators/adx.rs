// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. +DM / -DM per bar from successive high/low deltas. Only the larger,
//      positive move counts; the other is 0. The first bar has no
//      predecessor and carries 0 for both.
//   2. Wilder's smoothing (alpha = 1/period) of +DM, -DM and True Range.
//   3. +DI = smoothed(+DM) / ATR * 100, -DI likewise (0 when ATR is 0).
//   4. DX  = |+DI - -DI| / (+DI + -DI) * 100, with a negligible denominator
//      substituted when both DIs are 0.
//   5. ADX = Wilder's smoothed DX.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::atr::calculate_atr;
use super::ema::smooth;

/// Denominator used when +DI and -DI are both zero.
const DI_SUM_FLOOR: f64 = 1e-10;

/// ADX series aligned with the inputs. Empty when `period == 0`.
///
/// Values during the first `period` bars are unstable warm-up values; they
/// are defined (finite for finite inputs) but not meaningful.
pub fn calculate_adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    let n = high.len().min(low.len()).min(close.len());
    let alpha = 1.0 / period as f64;

    // ------------------------------------------------------------------
    // Step 1: Raw +DM / -DM
    // ------------------------------------------------------------------
    let mut plus_dm = Vec::with_capacity(n);
    let mut minus_dm = Vec::with_capacity(n);
    for i in 0..n {
        if i == 0 {
            plus_dm.push(0.0);
            minus_dm.push(0.0);
            continue;
        }
        let up_move = high[i] - high[i - 1];
        let down_move = low[i - 1] - low[i];

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
    }

    // ------------------------------------------------------------------
    // Steps 2-4: smoothing, DI, DX
    // ------------------------------------------------------------------
    let atr = calculate_atr(&high[..n], &low[..n], &close[..n], period);
    let smooth_plus = smooth(&plus_dm, alpha);
    let smooth_minus = smooth(&minus_dm, alpha);

    let dx: Vec<f64> = (0..n)
        .map(|i| compute_dx(smooth_plus[i], smooth_minus[i], atr[i]))
        .collect();

    // ------------------------------------------------------------------
    // Step 5: ADX
    // ------------------------------------------------------------------
    smooth(&dx, alpha)
}

/// DX from smoothed +DM, -DM and ATR.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, atr: f64) -> f64 {
    let (plus_di, minus_di) = if atr == 0.0 {
        (0.0, 0.0)
    } else {
        (smooth_plus_dm / atr * 100.0, smooth_minus_dm / atr * 100.0)
    };

    let mut di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        di_sum = DI_SUM_FLOOR;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}
