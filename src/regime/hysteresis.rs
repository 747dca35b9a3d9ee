// =============================================================================
// Regime Hysteresis
// =============================================================================
//
// The stable regime only switches after the instantaneous label has differed
// from it on `REGIME_STABILITY_BARS` consecutive bars. A bar matching the
// stable label resets the streak. State is carried explicitly through one
// ordered pass over the series; nothing persists between scans.

use super::classifier::RegimeLabel;

/// Consecutive differing bars required before the stable regime switches.
pub const REGIME_STABILITY_BARS: u32 = 3;

#[derive(Debug, Clone)]
pub struct StableRegimeTracker {
    stable: RegimeLabel,
    counter: u32,
}

impl StableRegimeTracker {
    /// Starts at "Neutral-Normal-Ranging" with an empty streak.
    pub fn new() -> Self {
        Self {
            stable: RegimeLabel::default(),
            counter: 0,
        }
    }

    /// Feed the next bar's instantaneous label and return the stable label
    /// in effect for that bar.
    pub fn update(&mut self, instant: RegimeLabel) -> RegimeLabel {
        if instant != self.stable {
            self.counter += 1;
            if self.counter >= REGIME_STABILITY_BARS {
                self.stable = instant;
                self.counter = 0;
            }
        } else {
            self.counter = 0;
        }
        self.stable
    }

    pub fn stable(&self) -> RegimeLabel {
        self.stable
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }
}

impl Default for StableRegimeTracker {
    fn default() -> Self {
        Self::new()
    }
}
