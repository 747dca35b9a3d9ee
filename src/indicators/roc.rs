// =============================================================================
// Rate of Change (ROC) — Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

/// ROC series aligned with `closes`. The first `period` entries, and any
/// entry whose reference close is 0, are NaN.
pub fn calculate_roc(closes: &[f64], period: usize) -> Vec<f64> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            if period == 0 || i < period {
                return f64::NAN;
            }
            let prev = closes[i - period];
            if prev == 0.0 {
                f64::NAN
            } else {
                (close - prev) / prev * 100.0
            }
        })
        .collect()
}

/// Average of the 10- and 20-bar ROC, used to break same-bar signal ties.
pub fn momentum(closes: &[f64]) -> Vec<f64> {
    let roc10 = calculate_roc(closes, 10);
    let roc20 = calculate_roc(closes, 20);
    roc10.iter().zip(&roc20).map(|(a, b)| (a + b) / 2.0).collect()
}
