// =============================================================================
// Regime Detection Module
// =============================================================================
//
// Market regime classification per closed bar:
// - Volatility (realised-vol ratio against its own history)
// - Trend strength (ADX)
// - Direction (EMA 20/50/200 alignment)
// plus a 3-bar hysteresis filter that yields the stable regime.

pub mod classifier;
pub mod hysteresis;

pub use classifier::{
    classify_series, DirectionRegime, RegimeLabel, RegimeState, TrendRegime, VolatilityRegime,
};
pub use hysteresis::StableRegimeTracker;
