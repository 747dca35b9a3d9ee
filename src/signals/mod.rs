// =============================================================================
// Signals Module
// =============================================================================
//
// Signal generation pipeline for the scanner:
// - Adaptive fast/slow TEMA periods (regime + timeframe + sensitivity)
// - Crossover detection with minimum-spacing validity filter
// - Crossover angle
// - The engine that runs the whole pipeline on one bar series

pub mod adaptive;
pub mod angle;
pub mod crossover;
pub mod engine;

#[cfg(test)]
pub(crate) mod fixtures;

pub use adaptive::{AdaptationSpeed, AdaptiveParams};
pub use crossover::{resolve_conflict, Crossover, SignalFilter, Validity};
pub use engine::{evaluate, SignalOutcome, SignalParams, MIN_CLOSED_BARS};
