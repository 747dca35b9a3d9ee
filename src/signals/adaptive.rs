// =============================================================================
// Adaptive TEMA Periods
// =============================================================================
//
// The fast/slow crossover periods shrink in calm, trending, short-timeframe
// conditions and stretch in volatile, ranging or long-timeframe ones:
//
//   combined      = volFactor * trendFactor * tfMultiplier * sensitivity
//   adjust        = clamp(1 / combined, 0.5, 1.5)
//   fast          = 8  + 13 * (1 - adjust)        -> clamp [8, 21]
//   slow          = 21 + 34 * (1 - adjust)        -> clamp [21, 55]
//   slow          = max(slow, fast + 6)
//
//   volFactor     High 0.7 | Low 1.3 | Normal 1.0
//   trendFactor   Trending 0.8 | Ranging 1.2
//   sensitivity   High 1.5 | Medium 1.0 | Low 0.5
//
// The real-valued periods are finally snapped to one of 14 precomputed TEMA
// lengths (7 fast, 7 slow).
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::regime::RegimeLabel;

pub const FAST_MIN: f64 = 8.0;
pub const FAST_MAX: f64 = 21.0;
pub const SLOW_MIN: f64 = 21.0;
pub const SLOW_MAX: f64 = 55.0;
/// Minimum distance between the fast and slow period.
pub const MIN_SEPARATION: f64 = 6.0;

/// Supported fast TEMA lengths, in snapping order.
pub const FAST_LENGTHS: [usize; 7] = [8, 10, 12, 14, 16, 18, 21];
/// Supported slow TEMA lengths, in snapping order.
pub const SLOW_LENGTHS: [usize; 7] = [26, 30, 34, 38, 42, 47, 55];

/// User-facing sensitivity of the period adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AdaptationSpeed {
    Low,
    #[default]
    Medium,
    High,
}

impl AdaptationSpeed {
    pub fn sensitivity(self) -> f64 {
        match self {
            Self::High => 1.5,
            Self::Medium => 1.0,
            Self::Low => 0.5,
        }
    }
}

impl std::fmt::Display for AdaptationSpeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl FromStr for AdaptationSpeed {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => anyhow::bail!("unknown adaptation speed '{other}'"),
        }
    }
}

/// Real-valued fast/slow periods for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdaptiveParams {
    pub fast: f64,
    pub slow: f64,
}

impl AdaptiveParams {
    /// Snapped `(fast, slow)` TEMA lengths.
    pub fn snapped(&self) -> (usize, usize) {
        (snap_fast(self.fast), snap_slow(self.slow))
    }
}

/// `clamp(1 / combined, 0.5, 1.5)` for the given stable regime.
pub fn adjust_factor(stable: &RegimeLabel, tf_multiplier: f64, speed: AdaptationSpeed) -> f64 {
    let vol = if stable.is_high_vol() {
        0.7
    } else if stable.is_low_vol() {
        1.3
    } else {
        1.0
    };
    let trend = if stable.is_trending() { 0.8 } else { 1.2 };
    let combined = vol * trend * tf_multiplier * speed.sensitivity();
    (1.0 / combined).clamp(0.5, 1.5)
}

pub fn adaptive_params(stable: &RegimeLabel, tf_multiplier: f64, speed: AdaptationSpeed) -> AdaptiveParams {
    let adjust = adjust_factor(stable, tf_multiplier, speed);
    let fast = (FAST_MIN + (FAST_MAX - FAST_MIN) * (1.0 - adjust)).clamp(FAST_MIN, FAST_MAX);
    let slow = (SLOW_MIN + (SLOW_MAX - SLOW_MIN) * (1.0 - adjust)).clamp(SLOW_MIN, SLOW_MAX);
    AdaptiveParams {
        fast,
        slow: slow.max(fast + MIN_SEPARATION),
    }
}

pub fn snap_fast(fast: f64) -> usize {
    match fast {
        f if f <= 9.0 => 8,
        f if f <= 11.0 => 10,
        f if f <= 13.0 => 12,
        f if f <= 15.0 => 14,
        f if f <= 17.0 => 16,
        f if f <= 19.0 => 18,
        _ => 21,
    }
}

pub fn snap_slow(slow: f64) -> usize {
    match slow {
        s if s <= 28.0 => 26,
        s if s <= 32.0 => 30,
        s if s <= 36.0 => 34,
        s if s <= 40.0 => 38,
        s if s <= 44.0 => 42,
        s if s <= 51.0 => 47,
        _ => 55,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::{DirectionRegime, TrendRegime, VolatilityRegime};

    fn label(vol: VolatilityRegime, trend: TrendRegime) -> RegimeLabel {
        RegimeLabel::new(DirectionRegime::Neutral, vol, trend)
    }

    #[test]
    fn separation_holds_for_every_combination() {
        let vols = [VolatilityRegime::High, VolatilityRegime::Low, VolatilityRegime::Normal];
        let trends = [TrendRegime::Trending, TrendRegime::Ranging];
        let speeds = [AdaptationSpeed::Low, AdaptationSpeed::Medium, AdaptationSpeed::High];
        let multipliers = [0.8, 1.0, 1.2, 1.3, 1.5];

        for vol in vols {
            for trend in trends {
                for speed in speeds {
                    for m in multipliers {
                        let p = adaptive_params(&label(vol, trend), m, speed);
                        assert!(p.slow >= p.fast + MIN_SEPARATION, "{vol} {trend} {speed} {m}: {p:?}");
                        assert!((FAST_MIN..=FAST_MAX).contains(&p.fast));
                        assert!(p.slow >= SLOW_MIN && p.slow <= SLOW_MAX);
                        let (f, s) = p.snapped();
                        assert!(FAST_LENGTHS.contains(&f));
                        assert!(SLOW_LENGTHS.contains(&s));
                    }
                }
            }
        }
    }

    #[test]
    fn neutral_conditions_give_base_periods() {
        // Normal vol, ranging (1.2), 30min (1.0), Medium -> adjust = 1/1.2
        let p = adaptive_params(&label(VolatilityRegime::Normal, TrendRegime::Ranging), 1.0, AdaptationSpeed::Medium);
        let adjust = 1.0 / 1.2;
        assert!((p.fast - (8.0 + 13.0 * (1.0 - adjust))).abs() < 1e-12);
        assert_eq!(p.snapped(), (10, 26));
    }

    #[test]
    fn high_volatility_hits_the_floor() {
        // 0.7 * 0.8 * 1.0 * 1.0 = 0.56 -> adjust clamps to 1.5
        let p = adaptive_params(&label(VolatilityRegime::High, TrendRegime::Trending), 1.0, AdaptationSpeed::Medium);
        assert_eq!(p.fast, FAST_MIN);
        assert_eq!(p.slow, SLOW_MIN);
        assert_eq!(p.snapped(), (8, 26));
    }

    #[test]
    fn long_timeframe_low_vol_stretches_periods() {
        // 1.3 * 1.2 * 1.5 * 1.5 = 3.51 -> adjust clamps to 0.5
        let p = adaptive_params(&label(VolatilityRegime::Low, TrendRegime::Ranging), 1.5, AdaptationSpeed::High);
        assert!((p.fast - 14.5).abs() < 1e-12);
        assert!((p.slow - 38.0).abs() < 1e-12);
        assert_eq!(p.snapped(), (14, 38));
    }

    #[test]
    fn snapping_bands() {
        assert_eq!(snap_fast(8.0), 8);
        assert_eq!(snap_fast(9.0), 8);
        assert_eq!(snap_fast(9.01), 10);
        assert_eq!(snap_fast(19.0), 18);
        assert_eq!(snap_fast(19.5), 21);
        assert_eq!(snap_slow(28.0), 26);
        assert_eq!(snap_slow(44.5), 47);
        assert_eq!(snap_slow(51.0), 47);
        assert_eq!(snap_slow(51.1), 55);
    }

    #[test]
    fn adaptation_speed_parses_case_insensitively() {
        assert_eq!("high".parse::<AdaptationSpeed>().unwrap(), AdaptationSpeed::High);
        assert_eq!(" Medium ".parse::<AdaptationSpeed>().unwrap(), AdaptationSpeed::Medium);
        assert!("fast".parse::<AdaptationSpeed>().is_err());
        assert_eq!(AdaptationSpeed::default(), AdaptationSpeed::Medium);
    }
}
