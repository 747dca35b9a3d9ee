// =============================================================================
// Binance Module
// =============================================================================
//
// Public REST client for the spot and USDⓈ-M futures venues, plus the
// per-venue request-weight tracker.

pub mod client;
pub mod rate_limit;

pub use client::BinanceClient;
pub use rate_limit::{RateLimitSnapshot, RateLimitTracker};
