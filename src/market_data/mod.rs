// =============================================================================
// Market Data Module
// =============================================================================
//
// Bar model, timeframe mapping, resampling, and the OHLCV provider contract.
// `fetch_series` is the single entry point the scanner uses: it sizes the
// request (lookback padding, resampling factor), normalises the response and
// trims it to the requested length.

pub mod bar;
pub mod resample;
pub mod symbol;
pub mod timeframe;

pub use bar::Bar;
pub use symbol::{MarketKind, VenueSymbol};
pub use timeframe::Timeframe;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Largest kline page the venue serves in a single request.
pub const MAX_KLINES_PER_REQUEST: usize = 1000;

/// Source of OHLCV bars at a native venue interval.
#[async_trait]
pub trait OhlcvProvider: Send + Sync {
    /// Fetch up to `limit` bars (oldest first) for `symbol` at `interval`.
    /// The last bar returned is the one currently forming.
    async fn fetch_ohlcv(&self, symbol: &VenueSymbol, interval: &str, limit: usize) -> Result<Vec<Bar>>;

    /// Release the underlying connection. Fetches after close fail.
    fn close(&self) {}
}

/// Fetch `limit` bars of `timeframe` for `symbol`, requesting `padding` extra
/// bars of lookback and resampling when the venue has no native interval.
pub async fn fetch_series(
    provider: &dyn OhlcvProvider,
    symbol: &VenueSymbol,
    timeframe: &Timeframe,
    limit: usize,
    padding: usize,
) -> Result<Vec<Bar>> {
    let plan = timeframe.fetch_plan();
    if !plan.recognised {
        warn!(timeframe = %timeframe, interval = plan.interval, "unrecognised timeframe, using default interval");
    }

    let request = ((limit + padding) * plan.resample_factor()).min(MAX_KLINES_PER_REQUEST);
    let raw = provider
        .fetch_ohlcv(symbol, plan.interval, request)
        .await
        .with_context(|| format!("fetching {symbol} at {}", plan.interval))?;
    let bars = bar::normalize(raw).with_context(|| format!("invalid bars for {symbol} {timeframe}"))?;

    let bars = match plan.resample_minutes {
        Some(bucket) => resample::resample(&bars, bucket),
        None => bars,
    };

    debug!(symbol = %symbol, timeframe = %timeframe, count = bars.len(), "bars fetched");
    Ok(bar::tail(bars, limit))
}
