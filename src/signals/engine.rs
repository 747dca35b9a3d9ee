// =============================================================================
// Adaptive TEMA Crossover Engine
// =============================================================================
//
// One evaluation of one symbol/timeframe:
//
//   1. Drop the forming bar; require >= 200 closed bars.
//   2. Regime per bar (classifier + hysteresis).
//   3. Adaptive fast/slow period per bar from the stable regime, snapped to
//      one of the 14 precomputed TEMA lengths.
//   4. Crossovers, spacing filter, same-bar conflict resolution.
//   5. Report only the latest closed bar, with its crossover angle.
//
// The engine is synchronous and CPU-bound; the scanner runs it on the
// blocking pool.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{calculate_tema, momentum};
use crate::market_data::bar::{closed_bars, Columns};
use crate::market_data::{Bar, Timeframe};
use crate::regime::classify_series;
use crate::types::Direction;

use super::adaptive::{adaptive_params, AdaptationSpeed, FAST_LENGTHS, SLOW_LENGTHS};
use super::angle::crossover_angle;
use super::crossover::{detect_crossovers, SignalFilter};

/// Closed bars required before any signal is evaluated.
pub const MIN_CLOSED_BARS: usize = 200;
/// Trailing bars whose per-bar frame is logged at debug level.
const DIAGNOSTIC_BARS: usize = 10;

/// User-tunable inputs of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalParams {
    pub adaptation_speed: AdaptationSpeed,
    pub min_bars_between: u32,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            adaptation_speed: AdaptationSpeed::Medium,
            min_bars_between: 3,
        }
    }
}

/// Result of one evaluation. `angle` is only present with a direction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalOutcome {
    pub direction: Option<Direction>,
    pub angle: Option<f64>,
}

/// Evaluate `bars` (oldest first, forming bar last).
///
/// Insufficient history is a defined "no signal" outcome. An error means the
/// series could not be evaluated at all (non-finite prices); callers log it
/// and treat it as no signal.
pub fn evaluate(bars: &[Bar], timeframe: &Timeframe, params: &SignalParams) -> Result<SignalOutcome> {
    let bars = closed_bars(bars);
    let n = bars.len();
    if n < MIN_CLOSED_BARS {
        debug!(timeframe = %timeframe, bars = n, "not enough closed bars");
        return Ok(SignalOutcome::default());
    }
    if let Some(bad) = bars
        .iter()
        .find(|b| !(b.high.is_finite() && b.low.is_finite() && b.close.is_finite()))
    {
        match bad.open_time() {
            Some(t) => anyhow::bail!("non-finite price in bar opened at {}", t.to_rfc3339()),
            None => anyhow::bail!("non-finite price in bar {}", bad.timestamp),
        }
    }

    let cols = Columns::from_bars(bars);
    let regimes = classify_series(&cols);
    let momentum = momentum(&cols.close);
    let tf_multiplier = timeframe.multiplier();

    let temas: BTreeMap<usize, Vec<f64>> = FAST_LENGTHS
        .iter()
        .chain(SLOW_LENGTHS.iter())
        .map(|&len| (len, calculate_tema(&cols.close, len)))
        .collect();

    // ------------------------------------------------------------------
    // Per-bar selected fast/slow TEMA
    // ------------------------------------------------------------------
    let mut lengths = Vec::with_capacity(n);
    let mut fast = Vec::with_capacity(n);
    let mut slow = Vec::with_capacity(n);
    for (i, state) in regimes.iter().enumerate() {
        let (fast_len, slow_len) =
            adaptive_params(&state.stable, tf_multiplier, params.adaptation_speed).snapped();
        let fast_series = temas
            .get(&fast_len)
            .with_context(|| format!("no TEMA({fast_len}) precomputed"))?;
        let slow_series = temas
            .get(&slow_len)
            .with_context(|| format!("no TEMA({slow_len}) precomputed"))?;
        lengths.push((fast_len, slow_len));
        fast.push(fast_series[i]);
        slow.push(slow_series[i]);
    }

    // ------------------------------------------------------------------
    // Crossovers and validity, in bar order
    // ------------------------------------------------------------------
    let crossovers = detect_crossovers(&fast, &slow);
    let mut filter = SignalFilter::new(params.min_bars_between);
    let validity: Vec<_> = crossovers
        .iter()
        .zip(&regimes)
        .zip(&momentum)
        .map(|((cross, state), m)| filter.update(*cross, &state.stable, *m))
        .collect();

    for i in n.saturating_sub(DIAGNOSTIC_BARS)..n {
        debug!(
            timeframe = %timeframe,
            bar = i,
            open_time = ?bars[i].open_time(),
            close = format!("{:.4}", cols.close[i]),
            tema_fast = format!("{:.4}", fast[i]),
            tema_slow = format!("{:.4}", slow[i]),
            lengths = ?lengths[i],
            long_cond = crossovers[i].long,
            short_cond = crossovers[i].short,
            long_valid = validity[i].long,
            short_valid = validity[i].short,
            regime = %regimes[i].stable,
            instant_regime = %regimes[i].instant,
            "signal frame"
        );
    }

    // ------------------------------------------------------------------
    // Latest closed bar only
    // ------------------------------------------------------------------
    let direction = validity[n - 1].direction();
    let angle = direction.and_then(|_| crossover_angle(&fast, &slow, &cols.close));
    if let Some(direction) = direction {
        debug!(timeframe = %timeframe, direction = %direction, angle = ?angle, "signal on latest closed bar");
    }

    Ok(SignalOutcome { direction, angle })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::fixtures::{bars_from_closes, reversal_closes};

    #[test]
    fn too_few_closed_bars_is_no_signal() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + i as f64).collect();
        // 200 fetched bars -> 199 closed
        let outcome = evaluate(&bars_from_closes(&closes), &Timeframe::new("1hr"), &SignalParams::default()).unwrap();
        assert_eq!(outcome, SignalOutcome::default());
    }

    #[test]
    fn empty_series_is_no_signal() {
        let outcome = evaluate(&[], &Timeframe::new("4hr"), &SignalParams::default()).unwrap();
        assert_eq!(outcome, SignalOutcome::default());
    }

    #[test]
    fn non_finite_price_is_an_error() {
        let mut bars = bars_from_closes(&vec![100.0; 260]);
        bars[100].close = f64::NAN;
        let err = evaluate(&bars, &Timeframe::new("1hr"), &SignalParams::default()).unwrap_err();
        // Bar 100 of an hourly series opens 4 days and 4 hours after the epoch.
        assert!(err.to_string().contains("1970-01-05T04:00:00"), "{err}");
    }

    #[test]
    fn flat_market_has_no_signal() {
        let bars = bars_from_closes(&vec![50.0; 300]);
        let outcome = evaluate(&bars, &Timeframe::new("15min"), &SignalParams::default()).unwrap();
        assert_eq!(outcome.direction, None);
        assert_eq!(outcome.angle, None);
    }

    #[test]
    fn long_reported_only_on_the_crossover_bar() {
        let bars = bars_from_closes(&reversal_closes());
        let timeframe = Timeframe::new("1hr");
        let params = SignalParams::default();

        for last_closed in 200..300 {
            // Closed bars 0..=last_closed plus one forming bar.
            let outcome = evaluate(&bars[..=last_closed + 1], &timeframe, &params).unwrap();
            if last_closed == 250 {
                assert_eq!(outcome.direction, Some(Direction::Long));
                let angle = outcome.angle.expect("angle accompanies a signal");
                assert!(angle > 0.0 && angle < 90.0, "angle {angle}");
            } else {
                assert_eq!(outcome, SignalOutcome::default(), "unexpected signal at bar {last_closed}");
            }
        }
    }
}
