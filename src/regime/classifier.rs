// =============================================================================
// Per-Bar Regime Classifier
// =============================================================================
//
// Every closed bar is labelled on three independent axes, using trailing
// windows only:
//
//   Volatility: realised-vol ratio (50-bar window):  > 1.3 HIGH, < 0.7 LOW
//   Trend     : ADX(14) > 25 TRENDING, otherwise RANGING
//   Direction : close > EMA20 > EMA50 > EMA200 BULLISH (strict chain),
//                the mirrored chain BEARISH, otherwise NEUTRAL
//
// The three labels render together as "<Direction>-<Volatility>-<Trend>",
// e.g. "Bullish-High-Trending". The instantaneous label is noisy; the signal
// engine consumes the hysteresis-filtered label from `hysteresis.rs`.

use serde::{Deserialize, Serialize};

use crate::indicators::{calculate_adx, calculate_ema, volatility_ratio};
use crate::market_data::bar::Columns;

use super::hysteresis::StableRegimeTracker;

/// Trailing window for realised volatility and its historical mean.
pub const VOLATILITY_WINDOW: usize = 50;
/// ADX look-back.
pub const ADX_PERIOD: usize = 14;
/// ADX level above which the market counts as trending.
pub const ADX_TREND_THRESHOLD: f64 = 25.0;

const HIGH_VOL_RATIO: f64 = 1.3;
const LOW_VOL_RATIO: f64 = 0.7;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityRegime {
    High,
    Low,
    Normal,
}

impl VolatilityRegime {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > HIGH_VOL_RATIO {
            Self::High
        } else if ratio < LOW_VOL_RATIO {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
            Self::Normal => write!(f, "Normal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendRegime {
    Trending,
    Ranging,
}

impl TrendRegime {
    pub fn from_adx(adx: f64) -> Self {
        if adx > ADX_TREND_THRESHOLD {
            Self::Trending
        } else {
            Self::Ranging
        }
    }
}

impl std::fmt::Display for TrendRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trending => write!(f, "Trending"),
            Self::Ranging => write!(f, "Ranging"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionRegime {
    Bullish,
    Bearish,
    Neutral,
}

impl DirectionRegime {
    /// Strict EMA ordering; any tie or NaN yields `Neutral`.
    pub fn from_chain(close: f64, ema20: f64, ema50: f64, ema200: f64) -> Self {
        if close > ema20 && ema20 > ema50 && ema50 > ema200 {
            Self::Bullish
        } else if close < ema20 && ema20 < ema50 && ema50 < ema200 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for DirectionRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Combined regime label for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegimeLabel {
    pub direction: DirectionRegime,
    pub volatility: VolatilityRegime,
    pub trend: TrendRegime,
}

impl RegimeLabel {
    pub const fn new(
        direction: DirectionRegime,
        volatility: VolatilityRegime,
        trend: TrendRegime,
    ) -> Self {
        Self {
            direction,
            volatility,
            trend,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.direction == DirectionRegime::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.direction == DirectionRegime::Bearish
    }

    pub fn is_high_vol(&self) -> bool {
        self.volatility == VolatilityRegime::High
    }

    pub fn is_low_vol(&self) -> bool {
        self.volatility == VolatilityRegime::Low
    }

    pub fn is_trending(&self) -> bool {
        self.trend == TrendRegime::Trending
    }

    pub fn is_ranging(&self) -> bool {
        self.trend == TrendRegime::Ranging
    }
}

impl Default for RegimeLabel {
    fn default() -> Self {
        Self::new(
            DirectionRegime::Neutral,
            VolatilityRegime::Normal,
            TrendRegime::Ranging,
        )
    }
}

impl std::fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.direction, self.volatility, self.trend)
    }
}

/// Regime state of one bar: the raw label and the hysteresis-filtered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegimeState {
    pub instant: RegimeLabel,
    pub stable: RegimeLabel,
}

// =============================================================================
// Series classification
// =============================================================================

/// Classify every bar of `cols` and run the hysteresis filter over the
/// result in one ordered pass. Output is aligned 1:1 with the input.
pub fn classify_series(cols: &Columns) -> Vec<RegimeState> {
    let n = cols.len();
    let adx = calculate_adx(&cols.high, &cols.low, &cols.close, ADX_PERIOD);
    let vol_ratio = volatility_ratio(&cols.close, VOLATILITY_WINDOW);
    let ema20 = calculate_ema(&cols.close, 20);
    let ema50 = calculate_ema(&cols.close, 50);
    let ema200 = calculate_ema(&cols.close, 200);

    let mut tracker = StableRegimeTracker::new();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let instant = RegimeLabel::new(
            DirectionRegime::from_chain(cols.close[i], ema20[i], ema50[i], ema200[i]),
            VolatilityRegime::from_ratio(vol_ratio[i]),
            TrendRegime::from_adx(adx[i]),
        );
        let stable = tracker.update(instant);
        out.push(RegimeState { instant, stable });
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::Bar;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 60_000, c, c * 1.002, c * 0.998, c, 1.0))
            .collect()
    }

    #[test]
    fn label_renders_direction_vol_trend() {
        assert_eq!(RegimeLabel::default().to_string(), "Neutral-Normal-Ranging");
        let label = RegimeLabel::new(
            DirectionRegime::Bullish,
            VolatilityRegime::High,
            TrendRegime::Trending,
        );
        assert_eq!(label.to_string(), "Bullish-High-Trending");
        assert!(label.is_bullish() && label.is_high_vol() && label.is_trending());
        assert!(!label.is_bearish() && !label.is_low_vol() && !label.is_ranging());
    }

    #[test]
    fn volatility_thresholds_are_strict() {
        assert_eq!(VolatilityRegime::from_ratio(1.3), VolatilityRegime::Normal);
        assert_eq!(VolatilityRegime::from_ratio(1.31), VolatilityRegime::High);
        assert_eq!(VolatilityRegime::from_ratio(0.7), VolatilityRegime::Normal);
        assert_eq!(VolatilityRegime::from_ratio(0.69), VolatilityRegime::Low);
    }

    #[test]
    fn adx_threshold_is_strict() {
        assert_eq!(TrendRegime::from_adx(25.0), TrendRegime::Ranging);
        assert_eq!(TrendRegime::from_adx(25.01), TrendRegime::Trending);
    }

    #[test]
    fn direction_requires_full_chain() {
        assert_eq!(DirectionRegime::from_chain(4.0, 3.0, 2.0, 1.0), DirectionRegime::Bullish);
        assert_eq!(DirectionRegime::from_chain(1.0, 2.0, 3.0, 4.0), DirectionRegime::Bearish);
        // One tie breaks the chain.
        assert_eq!(DirectionRegime::from_chain(4.0, 3.0, 3.0, 1.0), DirectionRegime::Neutral);
        assert_eq!(DirectionRegime::from_chain(4.0, 3.0, 2.0, f64::NAN), DirectionRegime::Neutral);
    }

    #[test]
    fn long_decline_settles_bearish_trending() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 * 0.996f64.powi(i)).collect();
        let cols = Columns::from_bars(&bars_from_closes(&closes));
        let states = classify_series(&cols);
        assert_eq!(states.len(), 300);
        assert_eq!(states[0].stable, RegimeLabel::default());
        let last = states[299].stable;
        assert!(last.is_bearish());
        assert!(last.is_trending());
    }

    #[test]
    fn stable_label_follows_instant_after_three_differing_bars() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 * 0.996f64.powi(i)).collect();
        let states = classify_series(&Columns::from_bars(&bars_from_closes(&closes)));

        let mut switches = 0;
        for i in 1..states.len() {
            if states[i].stable != states[i - 1].stable {
                switches += 1;
                assert!(i >= 2);
                assert_eq!(states[i].stable, states[i].instant);
                assert_ne!(states[i - 1].instant, states[i - 1].stable);
                assert_ne!(states[i - 2].instant, states[i - 2].stable);
            }
        }
        assert!(switches > 0);
    }
}
