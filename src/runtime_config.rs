// =============================================================================
// Runtime Configuration — scanner settings with serde defaults
// =============================================================================
//
// Central configuration for the Aurora scanner: the default scan request,
// orchestrator limits, symbol-universe caching and the scan interval.
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON
// file loads, and adding new fields never breaks an older config file.
// Selected fields can be overridden from the environment (`.env` included).
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scanner::ScanRequest;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_fetch_concurrency() -> usize {
    15
}

fn default_compute_workers() -> usize {
    4
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_pause_ms() -> u64 {
    100
}

fn default_bar_limit() -> usize {
    500
}

fn default_lookback_padding() -> usize {
    50
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_ranking_page_size() -> usize {
    250
}

fn default_scan_interval_secs() -> u64 {
    300
}

// =============================================================================
// ScannerLimits
// =============================================================================

/// Concurrency and sizing limits of the scan orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerLimits {
    /// Symbols fetching concurrently (each holds one permit for all its
    /// timeframes).
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    /// Signal evaluations running concurrently on the blocking pool.
    #[serde(default = "default_compute_workers")]
    pub compute_workers: usize,

    /// Symbols per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between batches, in milliseconds.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    /// Bars handed to the engine per symbol/timeframe.
    #[serde(default = "default_bar_limit")]
    pub bar_limit: usize,

    /// Extra bars requested on top of `bar_limit`.
    #[serde(default = "default_lookback_padding")]
    pub lookback_padding: usize,
}

impl Default for ScannerLimits {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
            compute_workers: default_compute_workers(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            bar_limit: default_bar_limit(),
            lookback_padding: default_lookback_padding(),
        }
    }
}

impl ScannerLimits {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

// =============================================================================
// UniverseConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// How long a resolved symbol list is reused.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Coins requested from the market-cap ranking.
    #[serde(default = "default_ranking_page_size")]
    pub ranking_page_size: usize,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            ranking_page_size: default_ranking_page_size(),
        }
    }
}

impl UniverseConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the Aurora scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Request used for every scheduled scan.
    #[serde(default)]
    pub scan: ScanRequest,

    #[serde(default)]
    pub limits: ScannerLimits,

    #[serde(default)]
    pub universe: UniverseConfig,

    /// Seconds between scheduled scans; 0 runs a single scan and exits.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scan: ScanRequest::default(),
            limits: ScannerLimits::default(),
            universe: UniverseConfig::default(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            timeframes = ?config.scan.timeframes,
            symbol_count = config.scan.symbol_count,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `AURORA_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("AURORA_SYMBOL_COUNT") {
            match v.trim().parse() {
                Ok(n) => self.scan.symbol_count = n,
                Err(_) => warn!(value = %v, "ignoring invalid AURORA_SYMBOL_COUNT"),
            }
        }
        if let Some(v) = lookup("AURORA_TIMEFRAMES") {
            let timeframes: Vec<String> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if timeframes.is_empty() {
                warn!(value = %v, "ignoring empty AURORA_TIMEFRAMES");
            } else {
                self.scan.timeframes = timeframes;
            }
        }
        if let Some(v) = lookup("AURORA_ADAPTATION_SPEED") {
            match v.parse() {
                Ok(speed) => self.scan.adaptation_speed = speed,
                Err(e) => warn!(error = %e, "ignoring invalid AURORA_ADAPTATION_SPEED"),
            }
        }
        if let Some(v) = lookup("AURORA_MIN_BARS_BETWEEN") {
            match v.trim().parse() {
                Ok(n) => self.scan.min_bars_between = n,
                Err(_) => warn!(value = %v, "ignoring invalid AURORA_MIN_BARS_BETWEEN"),
            }
        }
        if let Some(v) = lookup("AURORA_SCAN_INTERVAL_SECS") {
            match v.trim().parse() {
                Ok(n) => self.scan_interval_secs = n,
                Err(_) => warn!(value = %v, "ignoring invalid AURORA_SCAN_INTERVAL_SECS"),
            }
        }
    }
}
