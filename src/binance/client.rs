// =============================================================================
// Binance REST API Client — public market data
// =============================================================================
//
// Unsigned endpoints only: klines, exchangeInfo and 24h tickers, on both the
// spot venue (api.binance.com) and the USDⓈ-M futures venue
// (fapi.binance.com). Each venue has its own request-weight tracker.
//
// The client is shared read-only across the scan and closed exactly once at
// shutdown; any request after close fails without touching the network.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::rate_limit::{RateLimitSnapshot, RateLimitTracker};
use crate::market_data::{Bar, MarketKind, OhlcvProvider, VenueSymbol};
use crate::universe::{Ticker24h, VenueCatalog};

const SPOT_BASE_URL: &str = "https://api.binance.com";
const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

/// Self-imposed per-minute weight caps, below the venue limits
/// (6000 spot, 2400 futures).
const SPOT_WEIGHT_CAP: u32 = 5000;
const FUTURES_WEIGHT_CAP: u32 = 2000;

/// Only USDT-quoted pairs are scanned.
const QUOTE_ASSET: &str = "USDT";

/// Binance public market-data client.
pub struct BinanceClient {
    spot_base_url: String,
    futures_base_url: String,
    client: reqwest::Client,
    spot_limits: RateLimitTracker,
    futures_limits: RateLimitTracker,
    closed: AtomicBool,
}

impl BinanceClient {
    // -------------------------------------------------------------------------
    // Construction / lifecycle
    // -------------------------------------------------------------------------

    pub fn new() -> Self {
        Self::with_base_urls(SPOT_BASE_URL, FUTURES_BASE_URL)
    }

    /// Client against alternative hosts (testnet, proxy).
    pub fn with_base_urls(spot: impl Into<String>, futures: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        let spot_base_url = spot.into();
        let futures_base_url = futures.into();
        debug!(spot = %spot_base_url, futures = %futures_base_url, "BinanceClient initialised");

        Self {
            spot_base_url,
            futures_base_url,
            client,
            spot_limits: RateLimitTracker::new("spot", SPOT_WEIGHT_CAP),
            futures_limits: RateLimitTracker::new("futures", FUTURES_WEIGHT_CAP),
            closed: AtomicBool::new(false),
        }
    }

    /// Close the client. Returns `true` on the first call; later calls are
    /// logged no-ops.
    pub fn shutdown(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("BinanceClient already closed");
            return false;
        }
        info!("BinanceClient closed");
        true
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Current weight usage of both venues.
    pub fn rate_limits(&self) -> [RateLimitSnapshot; 2] {
        [self.spot_limits.snapshot(), self.futures_limits.snapshot()]
    }

    // -------------------------------------------------------------------------
    // Market data
    // -------------------------------------------------------------------------

    /// GET /api/v3/klines (spot) or /fapi/v1/klines (perpetual).
    ///
    /// Array indices:
    ///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume,
    ///   [6] closeTime, ...
    #[instrument(skip(self, symbol), fields(symbol = %symbol), name = "binance::get_klines")]
    pub async fn get_klines(&self, symbol: &VenueSymbol, interval: &str, limit: usize) -> Result<Vec<Bar>> {
        let path = match symbol.market {
            MarketKind::Spot => "/api/v3/klines",
            MarketKind::Perpetual => "/fapi/v1/klines",
        };
        let query = format!("symbol={}&interval={}&limit={}", symbol.venue_id(), interval, limit);
        let body = self
            .get_json(symbol.market, path, &query, kline_weight(symbol.market, limit))
            .await?;

        let raw = body.as_array().context("klines response is not an array")?;
        let mut bars = Vec::with_capacity(raw.len());
        for entry in raw {
            let arr = entry.as_array().context("kline entry is not an array")?;
            if arr.len() < 6 {
                warn!("skipping malformed kline entry with {} elements", arr.len());
                continue;
            }
            let open_time = arr[0].as_i64().context("kline open time is not an integer")?;
            bars.push(Bar::new(
                open_time,
                parse_str_f64(&arr[1])?,
                parse_str_f64(&arr[2])?,
                parse_str_f64(&arr[3])?,
                parse_str_f64(&arr[4])?,
                parse_str_f64(&arr[5])?,
            ));
        }

        debug!(interval, count = bars.len(), "klines fetched");
        Ok(bars)
    }

    /// USDT pairs currently `TRADING` on `market`. For the futures venue only
    /// `PERPETUAL` contracts are returned.
    #[instrument(skip(self), name = "binance::get_exchange_info")]
    pub async fn get_listed_pairs(&self, market: MarketKind) -> Result<Vec<VenueSymbol>> {
        let (path, weight) = match market {
            MarketKind::Spot => ("/api/v3/exchangeInfo", 20),
            MarketKind::Perpetual => ("/fapi/v1/exchangeInfo", 1),
        };
        let body = self.get_json(market, path, "", weight).await?;
        let symbols = body["symbols"]
            .as_array()
            .context("exchangeInfo response has no symbols array")?;

        let pairs: Vec<VenueSymbol> = symbols
            .iter()
            .filter(|s| s["status"].as_str() == Some("TRADING"))
            .filter(|s| s["quoteAsset"].as_str() == Some(QUOTE_ASSET))
            .filter(|s| match market {
                MarketKind::Perpetual => s["contractType"].as_str() == Some("PERPETUAL"),
                MarketKind::Spot => true,
            })
            .filter_map(|s| s["baseAsset"].as_str())
            .map(|base| VenueSymbol::new(base, QUOTE_ASSET, market))
            .collect();

        debug!(?market, count = pairs.len(), "listed pairs retrieved");
        Ok(pairs)
    }

    /// GET 24hr ticker statistics for every pair on `market`.
    #[instrument(skip(self), name = "binance::get_tickers_24h")]
    pub async fn get_tickers_24h(&self, market: MarketKind) -> Result<HashMap<String, Ticker24h>> {
        let (path, weight) = match market {
            MarketKind::Spot => ("/api/v3/ticker/24hr", 80),
            MarketKind::Perpetual => ("/fapi/v1/ticker/24hr", 40),
        };
        let body = self.get_json(market, path, "", weight).await?;
        let raw = body.as_array().context("24hr ticker response is not an array")?;

        let mut tickers = HashMap::with_capacity(raw.len());
        for entry in raw {
            let Some(symbol) = entry["symbol"].as_str() else {
                continue;
            };
            let change_pct = parse_str_f64(&entry["priceChangePercent"]);
            let last_price = parse_str_f64(&entry["lastPrice"]);
            match (change_pct, last_price) {
                (Ok(change_pct), Ok(last_price)) => {
                    tickers.insert(symbol.to_string(), Ticker24h { change_pct, last_price });
                }
                _ => warn!(symbol, "skipping malformed 24hr ticker"),
            }
        }

        debug!(?market, count = tickers.len(), "24hr tickers retrieved");
        Ok(tickers)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn venue(&self, market: MarketKind) -> (&str, &RateLimitTracker) {
        match market {
            MarketKind::Spot => (self.spot_base_url.as_str(), &self.spot_limits),
            MarketKind::Perpetual => (self.futures_base_url.as_str(), &self.futures_limits),
        }
    }

    /// GET `path?query` on the venue of `market`, enforcing the closed flag
    /// and the weight budget.
    async fn get_json(&self, market: MarketKind, path: &str, query: &str, weight: u32) -> Result<serde_json::Value> {
        if self.is_closed() {
            anyhow::bail!("BinanceClient is closed");
        }
        let (base_url, limits) = self.venue(market);
        if !limits.can_send_request(weight) {
            anyhow::bail!("request weight budget exhausted for GET {path}");
        }

        let url = if query.is_empty() {
            format!("{base_url}{path}")
        } else {
            format!("{base_url}{path}?{query}")
        };

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {path} request failed"))?;

        limits.update_from_headers(resp.headers());
        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {path} response"))?;

        if !status.is_success() {
            anyhow::bail!("Binance GET {} returned {}: {}", path, status, body);
        }
        Ok(body)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("spot_base_url", &self.spot_base_url)
            .field("futures_base_url", &self.futures_base_url)
            .field("closed", &self.is_closed())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Provider contracts
// -----------------------------------------------------------------------------

#[async_trait]
impl OhlcvProvider for BinanceClient {
    async fn fetch_ohlcv(&self, symbol: &VenueSymbol, interval: &str, limit: usize) -> Result<Vec<Bar>> {
        self.get_klines(symbol, interval, limit).await
    }

    fn close(&self) {
        self.shutdown();
    }
}

#[async_trait]
impl VenueCatalog for BinanceClient {
    async fn listed_symbols(&self, market: MarketKind) -> Result<Vec<VenueSymbol>> {
        self.get_listed_pairs(market).await
    }

    async fn tickers_24h(&self, market: MarketKind) -> Result<HashMap<String, Ticker24h>> {
        self.get_tickers_24h(market).await
    }
}

/// Request weight of a klines call.
fn kline_weight(market: MarketKind, limit: usize) -> u32 {
    match market {
        MarketKind::Spot => 2,
        MarketKind::Perpetual => match limit {
            0..=99 => 1,
            100..=499 => 2,
            500..=1000 => 5,
            _ => 10,
        },
    }
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}
