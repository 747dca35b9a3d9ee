// =============================================================================
// Symbol Universe Module
// =============================================================================
//
// Resolves "the top N coins by market cap that we can actually chart":
// a market-cap ranking from an aggregator, intersected with the pairs listed
// on the venue (USDⓈ-M perpetual preferred, spot as fallback), annotated with
// the venue's 24h change and last price. `SymbolUniverse` caches the result.

pub mod coingecko;
pub mod provider;

pub use coingecko::CoinGeckoClient;
pub use provider::{MarketRow, SymbolUniverse, UniverseEntry};

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::market_data::{MarketKind, VenueSymbol};

/// One entry of a market-cap ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAsset {
    /// Ticker symbol as reported by the ranking source, e.g. `btc`.
    pub symbol: String,
    pub market_cap_rank: Option<u32>,
}

/// 24h statistics of one venue pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ticker24h {
    pub change_pct: f64,
    pub last_price: f64,
}

/// Source of a market-cap ranking, best first.
#[async_trait]
pub trait MarketRankingProvider: Send + Sync {
    async fn top_by_market_cap(&self, page_size: usize) -> Result<Vec<RankedAsset>>;
}

/// Listings and 24h tickers of a trading venue.
#[async_trait]
pub trait VenueCatalog: Send + Sync {
    /// Pairs currently trading on `market`.
    async fn listed_symbols(&self, market: MarketKind) -> Result<Vec<VenueSymbol>>;

    /// 24h tickers on `market`, keyed by venue id (e.g. `BTCUSDT`).
    async fn tickers_24h(&self, market: MarketKind) -> Result<HashMap<String, Ticker24h>>;
}
