// =============================================================================
// Scan request / report
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::market_data::Timeframe;
use crate::signals::{AdaptationSpeed, SignalParams};
use crate::types::{SignalEvent, SignalRow};

fn default_timeframes() -> Vec<String> {
    vec!["1hr".to_string(), "4hr".to_string()]
}

fn default_min_bars_between() -> u32 {
    3
}

fn default_symbol_count() -> usize {
    20
}

/// What to scan and with which signal settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Index names from the dashboard form. The crypto scan resolves its
    /// symbols from the universe provider and only logs these.
    #[serde(default)]
    pub indices: Vec<String>,

    /// Timeframe labels, scanned in this order for every symbol.
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<String>,

    #[serde(default)]
    pub adaptation_speed: AdaptationSpeed,

    /// Minimum bars between two signals in the same direction.
    #[serde(default = "default_min_bars_between")]
    pub min_bars_between: u32,

    /// How many top symbols by market cap to scan.
    #[serde(default = "default_symbol_count", alias = "crypto_count")]
    pub symbol_count: usize,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            timeframes: default_timeframes(),
            adaptation_speed: AdaptationSpeed::default(),
            min_bars_between: default_min_bars_between(),
            symbol_count: default_symbol_count(),
        }
    }
}

impl ScanRequest {
    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            adaptation_speed: self.adaptation_speed,
            min_bars_between: self.min_bars_between,
        }
    }

    pub fn timeframes(&self) -> Vec<Timeframe> {
        self.timeframes.iter().map(Timeframe::new).collect()
    }
}

/// Outcome of one scan. `results` are in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub results: Vec<SignalEvent>,
    pub scan_time: DateTime<Utc>,
    /// Wall-clock duration, rounded to 2 decimals.
    pub duration_secs: f64,
    pub symbols_scanned: usize,
    pub batches: usize,
}

impl ScanReport {
    pub fn empty(scan_id: Uuid, scan_time: DateTime<Utc>) -> Self {
        Self {
            scan_id,
            results: Vec::new(),
            scan_time,
            duration_secs: 0.0,
            symbols_scanned: 0,
            batches: 0,
        }
    }

    /// Results as dashboard rows.
    pub fn rows(&self) -> Vec<SignalRow> {
        self.results.iter().map(SignalEvent::to_row).collect()
    }
}
