// =============================================================================
// CoinGecko market-cap ranking
// =============================================================================
//
// GET /api/v3/coins/markets?vs_currency=usd&order=market_cap_desc
//     &per_page=<n>&page=1
//
// Only the ticker symbol and rank are kept; prices come from the venue.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{MarketRankingProvider, RankedAsset};

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";
/// Largest page the markets endpoint serves.
const MAX_PAGE_SIZE: usize = 250;

#[derive(Debug, Deserialize)]
struct MarketEntry {
    symbol: String,
    #[serde(default)]
    market_cap_rank: Option<u32>,
}

/// Client for the public CoinGecko markets endpoint.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    #[instrument(skip(self), name = "coingecko::coins_markets")]
    pub async fn coins_markets(&self, page_size: usize) -> Result<Vec<RankedAsset>> {
        let per_page = page_size.clamp(1, MAX_PAGE_SIZE);
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, per_page
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /coins/markets request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko GET /coins/markets returned {}: {}", status, body);
        }

        let entries: Vec<MarketEntry> = resp
            .json()
            .await
            .context("failed to parse coins/markets response")?;

        debug!(count = entries.len(), "market-cap ranking retrieved");
        Ok(entries.into_iter().map(RankedAsset::from).collect())
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl From<MarketEntry> for RankedAsset {
    fn from(entry: MarketEntry) -> Self {
        Self {
            symbol: entry.symbol,
            market_cap_rank: entry.market_cap_rank,
        }
    }
}

#[async_trait]
impl MarketRankingProvider for CoinGeckoClient {
    async fn top_by_market_cap(&self, page_size: usize) -> Result<Vec<RankedAsset>> {
        self.coins_markets(page_size).await
    }
}
