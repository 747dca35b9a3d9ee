// =============================================================================
// Timeframe labels
// =============================================================================
//
// Scan requests carry dashboard-style labels ("15min", "1hr", "1 day", ...).
// This module maps a label to the exchange kline interval it is fetched at,
// the resampling bucket (if the venue has no native interval for it), and
// the adaptive-period multiplier.
//
//   label     venue interval   resample
//   15min     15m              -
//   30min     30m              -
//   45min     15m              45 minutes
//   1hr       1h               -
//   2hr       2h               -
//   4hr       4h               -
//   1 day     1d               -
//   1 week    1w               -
//   other     15m              -          (logged)
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// A requested timeframe, kept as the caller's label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeframe(String);

/// How a timeframe is fetched from the venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
    /// Venue kline interval.
    pub interval: &'static str,
    /// Length of the fetched interval in minutes.
    pub interval_minutes: i64,
    /// Bucket length in minutes when the series must be resampled.
    pub resample_minutes: Option<i64>,
    /// `false` when the label was not recognised and the default was used.
    pub recognised: bool,
}

impl FetchPlan {
    /// Number of fetched bars that make up one bar of the requested timeframe.
    pub fn resample_factor(&self) -> usize {
        match self.resample_minutes {
            Some(bucket) if self.interval_minutes > 0 => (bucket / self.interval_minutes).max(1) as usize,
            _ => 1,
        }
    }
}

impl Timeframe {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    fn normalized(&self) -> String {
        self.0.trim().to_lowercase()
    }

    /// Venue interval and resampling for this label.
    pub fn fetch_plan(&self) -> FetchPlan {
        let plan = |interval, interval_minutes, resample_minutes| FetchPlan {
            interval,
            interval_minutes,
            resample_minutes,
            recognised: true,
        };
        match self.normalized().as_str() {
            "15min" => plan("15m", 15, None),
            "30min" => plan("30m", 30, None),
            "45min" => plan("15m", 15, Some(45)),
            "1hr" => plan("1h", 60, None),
            "2hr" => plan("2h", 120, None),
            "4hr" => plan("4h", 240, None),
            "1 day" => plan("1d", 1440, None),
            "1 week" => plan("1w", 10080, None),
            _ => FetchPlan {
                recognised: false,
                ..plan("15m", 15, None)
            },
        }
    }

    /// Period multiplier used by the adaptive parameter engine.
    ///
    /// Intraday minutes: <=5 -> 0.8, <=60 -> 1.0, else 1.2. Hours are
    /// converted to minutes with the same cut-offs above 5. Daily -> 1.3,
    /// weekly -> 1.5. Anything that does not parse -> 1.0.
    pub fn multiplier(&self) -> f64 {
        let tf = self.normalized();
        if tf.contains("min") {
            match tf.replace("min", "").trim().parse::<i64>() {
                Ok(m) if m <= 5 => 0.8,
                Ok(m) if m <= 60 => 1.0,
                Ok(_) => 1.2,
                Err(_) => 1.0,
            }
        } else if tf.contains("hr") {
            match tf.replace("hr", "").trim().parse::<i64>() {
                Ok(h) if h.saturating_mul(60) <= 60 => 1.0,
                Ok(_) => 1.2,
                Err(_) => 1.0,
            }
        } else if tf.contains("day") {
            1.3
        } else if tf.contains("week") {
            1.5
        } else {
            1.0
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timeframe {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}
