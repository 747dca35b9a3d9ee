// =============================================================================
// Scan Orchestrator
// =============================================================================
//
// symbols x timeframes under two budgets:
//
//   fetch   : a semaphore of `fetch_concurrency` permits; a symbol holds one
//             permit while it walks its timeframes in order.
//   compute : evaluations go through the `ComputePool` (`compute_workers`
//             blocking slots).
//
// Symbols run in batches of `batch_size`, joined together, with a short
// pause between batches so other tasks on the runtime get a turn.
// Per-symbol/timeframe failures are logged and skipped; a scan always
// returns a report.
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::compute_pool::ComputePool;
use super::request::{ScanReport, ScanRequest};
use crate::market_data::{fetch_series, OhlcvProvider, Timeframe, VenueSymbol};
use crate::runtime_config::ScannerLimits;
use crate::signals::{evaluate, SignalParams, MIN_CLOSED_BARS};
use crate::types::SignalEvent;
use crate::universe::{SymbolUniverse, UniverseEntry};

/// A symbol to scan with the 24h change reported alongside its signals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTarget {
    pub symbol: VenueSymbol,
    pub change_pct: f64,
}

impl From<UniverseEntry> for ScanTarget {
    fn from(entry: UniverseEntry) -> Self {
        Self {
            symbol: entry.symbol,
            change_pct: entry.change_pct,
        }
    }
}

pub struct Scanner {
    ohlcv: Arc<dyn OhlcvProvider>,
    universe: Arc<SymbolUniverse>,
    limits: ScannerLimits,
    fetch_permits: Arc<Semaphore>,
    compute: ComputePool,
    closed: AtomicBool,
}

impl Scanner {
    pub fn new(ohlcv: Arc<dyn OhlcvProvider>, universe: Arc<SymbolUniverse>, limits: ScannerLimits) -> Self {
        let fetch_permits = Arc::new(Semaphore::new(limits.fetch_concurrency.max(1)));
        let compute = ComputePool::new(limits.compute_workers);
        Self {
            ohlcv,
            universe,
            limits,
            fetch_permits,
            compute,
            closed: AtomicBool::new(false),
        }
    }

    pub fn universe(&self) -> &SymbolUniverse {
        &self.universe
    }

    /// Scan the top `request.symbol_count` symbols of the universe.
    pub async fn scan(&self, request: &ScanRequest) -> ScanReport {
        let scan_id = Uuid::new_v4();
        info!(
            %scan_id,
            indices = ?request.indices,
            timeframes = ?request.timeframes,
            speed = %request.adaptation_speed,
            min_bars_between = request.min_bars_between,
            symbol_count = request.symbol_count,
            "scan requested"
        );

        let targets: Vec<ScanTarget> = self
            .universe
            .top_symbols(request.symbol_count)
            .await
            .into_iter()
            .map(ScanTarget::from)
            .collect();
        if targets.is_empty() {
            error!(%scan_id, "no symbols to scan");
            return ScanReport::empty(scan_id, Utc::now());
        }

        self.run(scan_id, &targets, request).await
    }

    /// Scan an explicit symbol set.
    pub async fn scan_symbols(&self, targets: &[ScanTarget], request: &ScanRequest) -> ScanReport {
        self.run(Uuid::new_v4(), targets, request).await
    }

    /// Close the exchange connection. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("scanner already shut down");
            return;
        }
        info!("scanner shutting down");
        self.ohlcv.close();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn run(&self, scan_id: Uuid, targets: &[ScanTarget], request: &ScanRequest) -> ScanReport {
        let scan_time = Utc::now();
        let started = Instant::now();
        let timeframes = request.timeframes();
        let params = request.signal_params();
        let results = Mutex::new(Vec::new());

        let mut batches = 0;
        for (index, batch) in targets.chunks(self.limits.batch_size.max(1)).enumerate() {
            batches += 1;
            info!(%scan_id, batch = index + 1, symbols = batch.len(), "scanning batch");
            join_all(
                batch
                    .iter()
                    .map(|target| self.scan_symbol(target, &timeframes, params, &results)),
            )
            .await;
            tokio::time::sleep(self.limits.batch_pause()).await;
        }

        let results = results.into_inner();
        let duration_secs = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
        info!(
            %scan_id,
            signals = results.len(),
            symbols = targets.len(),
            batches,
            duration_secs,
            "scan complete"
        );

        ScanReport {
            scan_id,
            results,
            scan_time,
            duration_secs,
            symbols_scanned: targets.len(),
            batches,
        }
    }

    async fn scan_symbol(
        &self,
        target: &ScanTarget,
        timeframes: &[Timeframe],
        params: SignalParams,
        results: &Mutex<Vec<SignalEvent>>,
    ) {
        let _permit = match self.fetch_permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(symbol = %target.symbol, error = %e, "fetch permits unavailable");
                return;
            }
        };

        for timeframe in timeframes {
            match self.scan_timeframe(target, timeframe, params).await {
                Ok(Some(event)) => results.lock().push(event),
                Ok(None) => {}
                Err(e) => error!(
                    symbol = %target.symbol,
                    timeframe = %timeframe,
                    error = %format!("{e:#}"),
                    "error scanning symbol"
                ),
            }
        }
    }

    async fn scan_timeframe(
        &self,
        target: &ScanTarget,
        timeframe: &Timeframe,
        params: SignalParams,
    ) -> Result<Option<SignalEvent>> {
        info!(symbol = %target.symbol, timeframe = %timeframe, "fetching bars");
        let bars = fetch_series(
            self.ohlcv.as_ref(),
            &target.symbol,
            timeframe,
            self.limits.bar_limit,
            self.limits.lookback_padding,
        )
        .await?;

        if bars.len() < MIN_CLOSED_BARS {
            warn!(symbol = %target.symbol, timeframe = %timeframe, bars = bars.len(), "insufficient history, skipping");
            return Ok(None);
        }

        let tf = timeframe.clone();
        let outcome = self
            .compute
            .run(move || evaluate(&bars, &tf, &params))
            .await?
            .context("signal evaluation failed")?;

        let Some(direction) = outcome.direction else {
            return Ok(None);
        };
        info!(
            symbol = %target.symbol,
            timeframe = %timeframe,
            direction = %direction,
            angle = ?outcome.angle,
            "signal found"
        );
        Ok(Some(SignalEvent {
            symbol: target.symbol.to_string(),
            timeframe: timeframe.label().to_string(),
            direction,
            angle: outcome.angle,
            daily_change: target.change_pct,
            detected_at: Utc::now(),
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{Bar, MarketKind};
    use crate::signals::fixtures::long_signal_bars;
    use crate::types::Direction;
    use crate::universe::{MarketRankingProvider, RankedAsset, Ticker24h, VenueCatalog};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Serves the long-signal fixture, failing for bases starting with "BAD".
    #[derive(Default)]
    struct MockExchange {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fetches: AtomicUsize,
        closes: AtomicUsize,
    }

    #[async_trait]
    impl OhlcvProvider for MockExchange {
        async fn fetch_ohlcv(&self, symbol: &VenueSymbol, _interval: &str, _limit: usize) -> Result<Vec<Bar>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.fetches.fetch_add(1, Ordering::SeqCst);

            if symbol.base.starts_with("BAD") {
                anyhow::bail!("exchange unavailable for {symbol}");
            }
            Ok(long_signal_bars())
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StaticRanking(Vec<String>);

    #[async_trait]
    impl MarketRankingProvider for StaticRanking {
        async fn top_by_market_cap(&self, _page_size: usize) -> Result<Vec<RankedAsset>> {
            Ok(self
                .0
                .iter()
                .map(|s| RankedAsset { symbol: s.clone(), market_cap_rank: None })
                .collect())
        }
    }

    struct PerpOnlyVenue(Vec<String>);

    #[async_trait]
    impl VenueCatalog for PerpOnlyVenue {
        async fn listed_symbols(&self, market: MarketKind) -> Result<Vec<VenueSymbol>> {
            Ok(match market {
                MarketKind::Perpetual => self.0.iter().map(|b| VenueSymbol::perpetual(b.as_str())).collect(),
                MarketKind::Spot => Vec::new(),
            })
        }

        async fn tickers_24h(&self, _market: MarketKind) -> Result<HashMap<String, Ticker24h>> {
            Ok(HashMap::from([(
                "AAAUSDT".to_string(),
                Ticker24h { change_pct: 3.456, last_price: 1.0 },
            )]))
        }
    }

    fn scanner_with(bases: Vec<String>) -> (Arc<MockExchange>, Scanner) {
        let exchange = Arc::new(MockExchange::default());
        let universe = Arc::new(SymbolUniverse::new(
            Arc::new(StaticRanking(bases.clone())),
            Arc::new(PerpOnlyVenue(bases)),
            Duration::from_secs(300),
            250,
        ));
        let scanner = Scanner::new(exchange.clone(), universe, ScannerLimits::default());
        (exchange, scanner)
    }

    fn request(timeframes: &[&str], symbol_count: usize) -> ScanRequest {
        ScanRequest {
            timeframes: timeframes.iter().map(|s| s.to_string()).collect(),
            symbol_count,
            ..ScanRequest::default()
        }
    }

    fn targets(n: usize) -> Vec<ScanTarget> {
        (0..n)
            .map(|i| ScanTarget {
                symbol: VenueSymbol::perpetual(format!("C{i:02}")),
                change_pct: 0.0,
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn batches_and_fetch_concurrency() {
        let (exchange, scanner) = scanner_with(Vec::new());
        let report = scanner.scan_symbols(&targets(45), &request(&["1hr"], 45)).await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.symbols_scanned, 45);
        assert_eq!(report.results.len(), 45);
        assert_eq!(exchange.fetches.load(Ordering::SeqCst), 45);
        let peak = exchange.peak.load(Ordering::SeqCst);
        assert!(peak <= 15, "peak in-flight fetches {peak}");
        assert!(peak > 1, "fetches never overlapped");
        assert_eq!(scanner.compute.workers(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn failures_are_skipped() {
        let (_, scanner) = scanner_with(Vec::new());
        let mut set = targets(3);
        set.push(ScanTarget {
            symbol: VenueSymbol::perpetual("BADCOIN"),
            change_pct: 0.0,
        });
        let report = scanner.scan_symbols(&set, &request(&["1hr", "4hr"], 4)).await;

        // Three good symbols x two timeframes; the failing symbol is dropped.
        assert_eq!(report.results.len(), 6);
        assert!(report.results.iter().all(|e| !e.symbol.starts_with("BADCOIN")));
        assert!(report.results.iter().all(|e| e.direction == Direction::Long));
    }

    #[tokio::test]
    async fn timeframes_run_in_request_order() {
        let (_, scanner) = scanner_with(Vec::new());
        let report = scanner
            .scan_symbols(&targets(1), &request(&["4hr", "1hr", "15min"], 1))
            .await;
        let order: Vec<&str> = report.results.iter().map(|e| e.timeframe.as_str()).collect();
        assert_eq!(order, vec!["4hr", "1hr", "15min"]);
    }

    #[tokio::test]
    async fn scan_resolves_symbols_from_universe() {
        let (_, scanner) = scanner_with(vec!["AAA".into(), "BBB".into(), "CCC".into()]);
        let report = scanner.scan(&request(&["1hr"], 2)).await;

        assert_eq!(report.symbols_scanned, 2);
        assert_eq!(report.batches, 1);
        let mut symbols: Vec<String> = report.results.iter().map(|e| e.symbol.clone()).collect();
        symbols.sort();
        assert_eq!(symbols, vec!["AAA/USDT:USDT", "BBB/USDT:USDT"]);

        let aaa = report.results.iter().find(|e| e.symbol.starts_with("AAA")).unwrap();
        assert_eq!(aaa.change_display(), "+3.46%");
        assert!(aaa.angle.is_some());
    }

    #[tokio::test]
    async fn empty_universe_gives_empty_report() {
        let (exchange, scanner) = scanner_with(Vec::new());
        let report = scanner.scan(&request(&["1hr"], 20)).await;
        assert!(report.results.is_empty());
        assert_eq!(report.symbols_scanned, 0);
        assert_eq!(report.batches, 0);
        assert_eq!(exchange.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shutdown_closes_exchange_once() {
        let (exchange, scanner) = scanner_with(Vec::new());
        scanner.shutdown();
        scanner.shutdown();
        assert_eq!(exchange.closes.load(Ordering::SeqCst), 1);
    }
}
