// =============================================================================
// Venue symbols
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which venue market a symbol trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    /// USDⓈ-M perpetual futures.
    Perpetual,
    Spot,
}

/// A tradable pair on the venue, e.g. BTC/USDT perpetual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VenueSymbol {
    pub base: String,
    pub quote: String,
    pub market: MarketKind,
}

impl VenueSymbol {
    pub fn new(base: impl Into<String>, quote: impl Into<String>, market: MarketKind) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
            market,
        }
    }

    pub fn perpetual(base: impl Into<String>) -> Self {
        Self::new(base, "USDT", MarketKind::Perpetual)
    }

    pub fn spot(base: impl Into<String>) -> Self {
        Self::new(base, "USDT", MarketKind::Spot)
    }

    /// Concatenated venue form used in REST paths, e.g. `BTCUSDT`.
    pub fn venue_id(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for VenueSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.market {
            MarketKind::Perpetual => write!(f, "{}/{}:{}", self.base, self.quote, self.quote),
            MarketKind::Spot => write!(f, "{}/{}", self.base, self.quote),
        }
    }
}
