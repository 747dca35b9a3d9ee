// =============================================================================
// Shared types used across the Aurora scanner
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a crossover signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// A signal detected on the latest closed bar of one symbol/timeframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalEvent {
    /// Display symbol, e.g. `BTC/USDT:USDT`.
    pub symbol: String,
    /// Timeframe label as requested, e.g. `4hr`.
    pub timeframe: String,
    pub direction: Direction,
    /// Crossover angle in degrees, when it could be computed.
    pub angle: Option<f64>,
    /// 24h percentage change of the symbol.
    pub daily_change: f64,
    pub detected_at: DateTime<Utc>,
}

impl SignalEvent {
    /// `"12.34°"`, or `"N/A"` without an angle.
    pub fn angle_display(&self) -> String {
        match self.angle {
            Some(angle) => format!("{angle:.2}°"),
            None => "N/A".to_string(),
        }
    }

    /// Signed percentage, e.g. `"+1.23%"`.
    pub fn change_display(&self) -> String {
        format!("{:+.2}%", self.daily_change)
    }

    /// Flat row in the shape dashboard consumers expect.
    pub fn to_row(&self) -> SignalRow {
        SignalRow {
            crypto_name: self.symbol.clone(),
            timeperiod: self.timeframe.clone(),
            signal: self.direction,
            angle: self.angle_display(),
            daily_change: self.change_display(),
            timestamp: self.detected_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalRow {
    #[serde(rename = "Crypto Name")]
    pub crypto_name: String,
    #[serde(rename = "Timeperiod")]
    pub timeperiod: String,
    #[serde(rename = "Signal")]
    pub signal: Direction,
    #[serde(rename = "Angle")]
    pub angle: String,
    #[serde(rename = "Daily Change")]
    pub daily_change: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}
