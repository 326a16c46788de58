//! Tracing and counters shared by the stockroom crates.

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// In-process counters for stock operations.
pub mod metrics;

pub use metrics::{MetricsSnapshot, StockMetrics};
