//! Performance monitoring utilities.
//!
//! - **Scoped timers**: RAII-style timing for code blocks, logged on drop
//! - **Aggregated statistics**: per-operation timing collected into a
//!   [`PerfLog`], reported by the `summary` command

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Timing statistics for a named operation
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OperationStats {
    pub count: usize,
    pub total_ms: f64,
    pub max_ms: f64,
}

impl OperationStats {
    pub fn record(&mut self, elapsed_ms: f64) {
        self.count += 1;
        self.total_ms += elapsed_ms;
        self.max_ms = self.max_ms.max(elapsed_ms);
    }
}

/// Collected timings keyed by operation name
#[derive(Clone, Debug, Default, Serialize)]
pub struct PerfLog {
    operations: BTreeMap<String, OperationStats>,
}

impl PerfLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, elapsed_ms: f64) {
        self.operations
            .entry(name.to_string())
            .or_default()
            .record(elapsed_ms);
    }

    /// Time a closure and record it under `name`
    pub fn measure<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(name, start.elapsed().as_secs_f64() * 1000.0);
        result
    }

    pub fn get(&self, name: &str) -> Option<&OperationStats> {
        self.operations.get(name)
    }

    pub fn total_ms(&self) -> f64 {
        self.operations.values().map(|s| s.total_ms).sum()
    }
}

/// RAII timer that logs how long its scope took.
///
/// Logs at `debug` always, and at `warn` when the threshold is exceeded.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    /// Create a new scoped timer with a warning threshold.
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Get elapsed time without stopping the timer.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms > self.threshold_ms {
            warn!(
                "[PERF] {} took {:.2}ms (threshold: {:.2}ms)",
                self.name, elapsed_ms, self.threshold_ms
            );
        } else {
            debug!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);
        }
    }
}
