// =============================================================================
// Realised Volatility Ratio
// =============================================================================
//
//   r_t        = ln(close_t / close_{t-1})
//   vol_t      = population stdev of r over `window` bars * sqrt(252) * 100
//   hist_vol_t = mean of vol over `window` bars
//   ratio_t    = vol_t / hist_vol_t
//
// A rolling statistic is only defined once its whole window is defined, so
// the first defined vol sits at index `window` and the first defined
// hist_vol at `2 * window - 1`. Wherever the ratio is undefined (or the
// historical volatility is 0) it falls back to 1.0, i.e. "normal".
// =============================================================================

const ANNUALISATION_DAYS: f64 = 252.0;

/// Annualised rolling volatility of log returns, NaN where undefined.
pub fn rolling_volatility(closes: &[f64], window: usize) -> Vec<f64> {
    let n = closes.len();
    let mut vol = vec![f64::NAN; n];
    if window == 0 {
        return vol;
    }

    let mut returns = vec![f64::NAN; n];
    for i in 1..n {
        returns[i] = (closes[i] / closes[i - 1]).ln();
    }

    let scale = ANNUALISATION_DAYS.sqrt() * 100.0;
    for i in window..n {
        let win = &returns[i + 1 - window..=i];
        if win.iter().any(|r| !r.is_finite()) {
            continue;
        }
        let mean = win.iter().sum::<f64>() / window as f64;
        let var = win.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / window as f64;
        vol[i] = var.sqrt() * scale;
    }
    vol
}

/// Current volatility relative to its own rolling mean, 1.0 where undefined.
pub fn volatility_ratio(closes: &[f64], window: usize) -> Vec<f64> {
    let vol = rolling_volatility(closes, window);
    let n = vol.len();
    let mut ratio = vec![1.0; n];
    if window == 0 {
        return ratio;
    }

    for i in (window - 1)..n {
        let win = &vol[i + 1 - window..=i];
        if win.iter().any(|v| v.is_nan()) {
            continue;
        }
        let hist = win.iter().sum::<f64>() / window as f64;
        let value = vol[i] / hist;
        if hist != 0.0 && value.is_finite() {
            ratio[i] = value;
        }
    }
    ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volatility_warm_up_is_undefined() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64).sin()).collect();
        let vol = rolling_volatility(&closes, 50);
        assert!(vol[49].is_nan());
        assert!(vol[50].is_finite());
    }

    #[test]
    fn ratio_defaults_to_one_before_history() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let ratio = volatility_ratio(&closes, 50);
        assert!(ratio[..99].iter().all(|r| *r == 1.0));
    }

    #[test]
    fn ratio_is_one_for_steady_volatility() {
        // Returns repeat every 10 bars, so every 50-bar window has the same stdev.
        let mut closes = vec![100.0];
        for i in 1..250 {
            let r = 0.01 * (2.0 * std::f64::consts::PI * i as f64 / 10.0).sin();
            let last = closes[i - 1];
            closes.push(last * r.exp());
        }
        let ratio = volatility_ratio(&closes, 50);
        for r in &ratio[99..] {
            assert!((r - 1.0).abs() < 1e-6, "ratio {r}");
        }
    }

    #[test]
    fn volatility_spike_raises_ratio() {
        let mut closes: Vec<f64> = (0..150).map(|i| 100.0 + (i as f64 * 0.9).sin() * 0.2).collect();
        for i in 0..20 {
            let last = *closes.last().unwrap();
            closes.push(last * if i % 2 == 0 { 1.06 } else { 0.95 });
        }
        let ratio = volatility_ratio(&closes, 50);
        assert!(*ratio.last().unwrap() > 1.3);
    }
}
