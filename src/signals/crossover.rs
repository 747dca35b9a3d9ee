// =============================================================================
// Crossover Conditions and Validity Filter
// =============================================================================
//
// long  : fast crosses above slow  (prev fast <= prev slow, fast > slow)
// short : fast crosses below slow  (prev fast >= prev slow, fast < slow)
//
// A condition is only *valid* when at least `min_bars_between` bars have
// passed since the previous condition in the same direction, measured by the
// previous bar's counter. Before any condition has fired the counter is
// unset and every condition passes.
//
// Both directions valid on one bar is resolved by the stable regime, then by
// momentum. Zero or undefined momentum resolves to SHORT.
// =============================================================================

use crate::regime::RegimeLabel;
use crate::types::Direction;

/// Crossover flags for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crossover {
    pub long: bool,
    pub short: bool,
}

/// Crossover flags per bar for the given fast/slow series. Bar 0 has no
/// predecessor and never crosses.
pub fn detect_crossovers(fast: &[f64], slow: &[f64]) -> Vec<Crossover> {
    let n = fast.len().min(slow.len());
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        if i == 0 {
            out.push(Crossover::default());
            continue;
        }
        out.push(Crossover {
            long: fast[i] > slow[i] && fast[i - 1] <= slow[i - 1],
            short: fast[i] < slow[i] && fast[i - 1] >= slow[i - 1],
        });
    }
    out
}

/// Validated signal flags for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    pub long: bool,
    pub short: bool,
}

impl Validity {
    pub fn direction(&self) -> Option<Direction> {
        if self.long {
            Some(Direction::Long)
        } else if self.short {
            Some(Direction::Short)
        } else {
            None
        }
    }
}

/// Bars-since-last-condition counters threaded through one ordered pass.
#[derive(Debug, Clone)]
pub struct SignalFilter {
    min_bars_between: u32,
    since_long: Option<u32>,
    since_short: Option<u32>,
}

impl SignalFilter {
    pub fn new(min_bars_between: u32) -> Self {
        Self {
            min_bars_between,
            since_long: None,
            since_short: None,
        }
    }

    /// Advance by one bar. `stable` and `momentum` are only consulted when
    /// both directions are valid on the same bar.
    pub fn update(&mut self, cross: Crossover, stable: &RegimeLabel, momentum: f64) -> Validity {
        let long = cross.long && self.spaced(self.since_long);
        let short = cross.short && self.spaced(self.since_short);

        self.since_long = advance(self.since_long, cross.long);
        self.since_short = advance(self.since_short, cross.short);

        if long && short {
            return match resolve_conflict(stable, momentum) {
                Direction::Long => Validity { long: true, short: false },
                Direction::Short => Validity { long: false, short: true },
            };
        }
        Validity { long, short }
    }

    fn spaced(&self, since: Option<u32>) -> bool {
        since.map_or(true, |bars| bars >= self.min_bars_between)
    }
}

fn advance(since: Option<u32>, fired: bool) -> Option<u32> {
    if fired {
        Some(0)
    } else {
        since.map(|bars| bars.saturating_add(1))
    }
}

/// Pick a side when long and short are valid on the same bar.
pub fn resolve_conflict(stable: &RegimeLabel, momentum: f64) -> Direction {
    if stable.is_bullish() {
        Direction::Long
    } else if stable.is_bearish() {
        Direction::Short
    } else if momentum > 0.0 {
        Direction::Long
    } else {
        Direction::Short
    }
}
