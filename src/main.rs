// =============================================================================
// Aurora Scanner — Main Entry Point
// =============================================================================
//
// Runs the adaptive TEMA crossover scan on a fixed interval (or once, when
// `scan_interval_secs` is 0) and prints each report as JSON rows.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use aurora_scanner::binance::BinanceClient;
use aurora_scanner::runtime_config::RuntimeConfig;
use aurora_scanner::scanner::{ScanReport, Scanner};
use aurora_scanner::universe::{CoinGeckoClient, SymbolUniverse};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Aurora Scanner — Starting Up                      ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = RuntimeConfig::load("runtime_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    info!(
        timeframes = ?config.scan.timeframes,
        symbol_count = config.scan.symbol_count,
        speed = %config.scan.adaptation_speed,
        interval_secs = config.scan_interval_secs,
        "Configuration ready"
    );

    // ── 2. Clients & scanner ─────────────────────────────────────────────
    let binance = Arc::new(BinanceClient::new());
    let universe = Arc::new(SymbolUniverse::new(
        Arc::new(CoinGeckoClient::new()),
        binance.clone(),
        config.universe.cache_ttl(),
        config.universe.ranking_page_size,
    ));
    let scanner = Scanner::new(binance.clone(), universe, config.limits.clone());

    // ── 3. Scan loop ─────────────────────────────────────────────────────
    if config.scan_interval_secs == 0 {
        let report = scanner.scan(&config.scan).await;
        print_report(&report);
    } else {
        info!("Scanner running. Press Ctrl+C to stop.");
        let (scanner, request) = (&scanner, &config.scan);
        let completed = run_scans(
            Duration::from_secs(config.scan_interval_secs),
            move || async move {
                let report = scanner.scan(request).await;
                print_report(&report);
            },
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
            },
        )
        .await;
        info!(completed, "Scan loop stopped");
    }

    // ── 4. Shutdown ──────────────────────────────────────────────────────
    scanner.shutdown();
    info!(rate_limits = ?binance.rate_limits(), "Aurora Scanner shut down complete.");
    Ok(())
}

/// Run `scan_once` every `period` until `shutdown` resolves. Shutdown is
/// watched while waiting for the next tick and while a scan is running; an
/// interrupted scan is dropped. Returns the number of completed scans.
async fn run_scans<F, Fut>(period: Duration, mut scan_once: F, shutdown: impl Future<Output = ()>) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(period);
    let mut completed = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            _ = &mut shutdown => {
                warn!("Shutdown requested during a scan, abandoning it");
                break;
            }
            _ = scan_once() => completed += 1,
        }
    }
    completed
}

fn print_report(report: &ScanReport) {
    info!(
        scan_id = %report.scan_id,
        signals = report.results.len(),
        symbols = report.symbols_scanned,
        duration_secs = report.duration_secs,
        "Scan finished"
    );
    match serde_json::to_string_pretty(&report.rows()) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to serialise scan report"),
    }
}
