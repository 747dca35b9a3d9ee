// =============================================================================
// Request-Weight Tracker — keeps scans under the Binance per-minute budget
// =============================================================================
//
// Binance meters public REST usage in request *weight* per rolling minute,
// separately for the spot and the USDⓈ-M futures venue. Every response
// carries the venue's current usage in `X-MBX-USED-WEIGHT-1M`; the tracker
// stores it in an atomic and refuses requests that would push past a
// self-imposed hard cap below the venue limit.
//
// The header is only refreshed by traffic, so a reading older than one
// minute is treated as zero: the window it described has rolled over.
// =============================================================================

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Length of the venue's weight window.
const WINDOW_MS: i64 = 60_000;

/// Thread-safe weight tracker for one venue.
pub struct RateLimitTracker {
    venue: &'static str,
    hard_limit: u32,
    warn_threshold: u32,
    used_weight_1m: AtomicU32,
    /// Epoch ms of the last header reading, 0 before the first.
    updated_at_ms: AtomicI64,
}

/// Serialisable view of the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub venue: String,
    pub used_weight_1m: u32,
    pub hard_limit: u32,
}

impl RateLimitTracker {
    /// `hard_limit` is the weight we allow ourselves per minute; warnings
    /// start at 80% of it.
    pub fn new(venue: &'static str, hard_limit: u32) -> Self {
        Self {
            venue,
            hard_limit,
            warn_threshold: hard_limit / 5 * 4,
            used_weight_1m: AtomicU32::new(0),
            updated_at_ms: AtomicI64::new(0),
        }
    }

    // -------------------------------------------------------------------------
    // Header-based updates
    // -------------------------------------------------------------------------

    /// Record the venue's reported usage from a response.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let Some(weight) = headers
            .get("X-MBX-USED-WEIGHT-1M")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
        else {
            return;
        };
        self.record_weight(weight, Utc::now().timestamp_millis());
    }

    fn record_weight(&self, weight: u32, now_ms: i64) {
        let prev = self.current_weight(now_ms);
        self.used_weight_1m.store(weight, Ordering::Relaxed);
        self.updated_at_ms.store(now_ms, Ordering::Relaxed);

        if weight >= self.warn_threshold && prev < self.warn_threshold {
            warn!(
                venue = self.venue,
                used_weight = weight,
                hard_limit = self.hard_limit,
                "rate-limit weight crossed warning threshold"
            );
        }
        debug!(venue = self.venue, used_weight_1m = weight, "rate-limit weight updated from header");
    }

    fn current_weight(&self, now_ms: i64) -> u32 {
        let updated = self.updated_at_ms.load(Ordering::Relaxed);
        if updated == 0 || now_ms - updated >= WINDOW_MS {
            0
        } else {
            self.used_weight_1m.load(Ordering::Relaxed)
        }
    }

    // -------------------------------------------------------------------------
    // Pre-flight check
    // -------------------------------------------------------------------------

    /// `true` if `weight` more request weight stays within the hard cap.
    pub fn can_send_request(&self, weight: u32) -> bool {
        self.can_send_at(weight, Utc::now().timestamp_millis())
    }

    fn can_send_at(&self, weight: u32, now_ms: i64) -> bool {
        let current = self.current_weight(now_ms);
        let allowed = current + weight <= self.hard_limit;
        if !allowed {
            warn!(
                venue = self.venue,
                current_weight = current,
                requested_weight = weight,
                hard_limit = self.hard_limit,
                "request blocked, would exceed rate-limit"
            );
        }
        allowed
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        RateLimitSnapshot {
            venue: self.venue.to_string(),
            used_weight_1m: self.current_weight(Utc::now().timestamp_millis()),
            hard_limit: self.hard_limit,
        }
    }
}

impl std::fmt::Debug for RateLimitTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitTracker")
            .field("venue", &self.venue)
            .field("used_weight_1m", &self.used_weight_1m.load(Ordering::Relaxed))
            .field("hard_limit", &self.hard_limit)
            .finish()
    }
}
