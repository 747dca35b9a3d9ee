// =============================================================================
// Scanner Module
// =============================================================================
//
// Scan requests and reports, the bounded compute pool, and the orchestrator
// that fans a scan out over symbols and timeframes.

pub mod compute_pool;
pub mod orchestrator;
pub mod request;

pub use compute_pool::ComputePool;
pub use orchestrator::{ScanTarget, Scanner};
pub use request::{ScanReport, ScanRequest};
