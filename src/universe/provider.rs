// =============================================================================
// Symbol Universe Provider — cached top-N venue symbols
// =============================================================================
//
// 1. Ranking: top coins by market cap (one page).
// 2. Listings: perpetual and spot USDT pairs on the venue.
// 3. Match each ranked coin to its perpetual pair, falling back to spot.
// 4. Annotate with the venue's 24h change and last price.
//
// The full matched list is cached for `ttl` and sliced per request. On any
// upstream failure, or a refresh that matches nothing, the previous list is
// served (however old), or an empty list when there is none. An empty list
// is never cached. Callers never see an error.
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::{MarketRankingProvider, Ticker24h, VenueCatalog};
use crate::market_data::{MarketKind, VenueSymbol};

/// One scannable symbol with its 24h statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniverseEntry {
    pub symbol: VenueSymbol,
    /// 24h percentage change; 0 when the venue has no ticker for the pair.
    pub change_pct: f64,
    pub last_price: Option<f64>,
}

/// Dashboard row of the market overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRow {
    /// Base asset, e.g. `BTC`.
    pub name: String,
    pub price: Option<f64>,
    pub change: f64,
}

struct CachedUniverse {
    entries: Arc<Vec<UniverseEntry>>,
    fetched_at: Instant,
}

pub struct SymbolUniverse {
    ranking: Arc<dyn MarketRankingProvider>,
    venue: Arc<dyn VenueCatalog>,
    ttl: Duration,
    page_size: usize,
    cache: RwLock<Option<CachedUniverse>>,
}

impl SymbolUniverse {
    pub fn new(
        ranking: Arc<dyn MarketRankingProvider>,
        venue: Arc<dyn VenueCatalog>,
        ttl: Duration,
        page_size: usize,
    ) -> Self {
        Self {
            ranking,
            venue,
            ttl,
            page_size,
            cache: RwLock::new(None),
        }
    }

    /// Top `limit` symbols by market cap that trade on the venue.
    pub async fn top_symbols(&self, limit: usize) -> Vec<UniverseEntry> {
        if let Some(entries) = self.fresh_cache() {
            info!(limit, "using cached symbol list");
            return take(&entries, limit);
        }

        info!(limit, page_size = self.page_size, "refreshing symbol universe");
        match self.fetch_universe().await {
            Ok(entries) if entries.is_empty() => {
                warn!("symbol universe refresh matched nothing, not caching");
                self.stale_or_empty(limit)
            }
            Ok(entries) => {
                let entries = Arc::new(entries);
                *self.cache.write() = Some(CachedUniverse {
                    entries: Arc::clone(&entries),
                    fetched_at: Instant::now(),
                });
                info!(matched = entries.len(), "symbol universe refreshed");
                take(&entries, limit)
            }
            Err(e) => {
                error!(error = %e, "failed to refresh symbol universe");
                self.stale_or_empty(limit)
            }
        }
    }

    /// Top `limit` entries as `{name, price, change}` rows.
    pub async fn market_overview(&self, limit: usize) -> Vec<MarketRow> {
        self.top_symbols(limit)
            .await
            .into_iter()
            .map(|entry| MarketRow {
                name: entry.symbol.base.clone(),
                price: entry.last_price,
                change: entry.change_pct,
            })
            .collect()
    }

    /// Previous non-empty list regardless of age, or nothing.
    fn stale_or_empty(&self, limit: usize) -> Vec<UniverseEntry> {
        match self.cache.read().as_ref() {
            Some(stale) if !stale.entries.is_empty() => {
                warn!(age_secs = stale.fetched_at.elapsed().as_secs(), "serving stale symbol list");
                take(&stale.entries, limit)
            }
            _ => Vec::new(),
        }
    }

    fn fresh_cache(&self) -> Option<Arc<Vec<UniverseEntry>>> {
        let cache = self.cache.read();
        let cached = cache.as_ref()?;
        (!cached.entries.is_empty() && cached.fetched_at.elapsed() < self.ttl)
            .then(|| Arc::clone(&cached.entries))
    }

    async fn fetch_universe(&self) -> Result<Vec<UniverseEntry>> {
        let ranked = self
            .ranking
            .top_by_market_cap(self.page_size)
            .await
            .context("market-cap ranking unavailable")?;

        let (perps, spots, perp_tickers, spot_tickers) = tokio::try_join!(
            self.venue.listed_symbols(MarketKind::Perpetual),
            self.venue.listed_symbols(MarketKind::Spot),
            self.venue.tickers_24h(MarketKind::Perpetual),
            self.venue.tickers_24h(MarketKind::Spot),
        )
        .context("venue catalog unavailable")?;

        let perp_bases: HashSet<&str> = perps.iter().map(|s| s.base.as_str()).collect();
        let spot_bases: HashSet<&str> = spots.iter().map(|s| s.base.as_str()).collect();

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for asset in &ranked {
            let base = asset.symbol.trim().to_uppercase();
            if !seen.insert(base.clone()) {
                continue;
            }
            let (symbol, tickers) = if perp_bases.contains(base.as_str()) {
                (VenueSymbol::perpetual(base), &perp_tickers)
            } else if spot_bases.contains(base.as_str()) {
                (VenueSymbol::spot(base), &spot_tickers)
            } else {
                continue;
            };
            entries.push(annotate(symbol, tickers));
        }
        Ok(entries)
    }
}

fn annotate(symbol: VenueSymbol, tickers: &HashMap<String, Ticker24h>) -> UniverseEntry {
    let ticker = tickers.get(&symbol.venue_id());
    UniverseEntry {
        change_pct: ticker.map_or(0.0, |t| t.change_pct),
        last_price: ticker.map(|t| t.last_price),
        symbol,
    }
}

fn take(entries: &[UniverseEntry], limit: usize) -> Vec<UniverseEntry> {
    entries.iter().take(limit).cloned().collect()
}
