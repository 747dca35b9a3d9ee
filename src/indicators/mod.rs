// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator transforms used by the signal engine.
// Every function returns a series aligned 1:1 with its input; warm-up values
// are defined (seeded by the first observation) rather than omitted, so that
// per-bar consumers can index all series with the same offset.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod roc;
pub mod volatility;

pub use adx::calculate_adx;
pub use atr::calculate_atr;
pub use ema::{calculate_ema, calculate_tema};
pub use roc::{calculate_roc, momentum};
pub use volatility::volatility_ratio;
