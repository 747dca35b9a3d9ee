// =============================================================================
// Aurora Scanner
// =============================================================================
//
// Adaptive TEMA crossover scanner: resolves the top market-cap symbols that
// trade on Binance, fetches their OHLCV history per timeframe, and reports
// LONG/SHORT crossovers on the latest closed bar.
// =============================================================================

pub mod binance;
pub mod indicators;
pub mod market_data;
pub mod regime;
pub mod runtime_config;
pub mod scanner;
pub mod signals;
pub mod types;
pub mod universe;
