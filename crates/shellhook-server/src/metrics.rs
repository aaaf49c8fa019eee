//! Process-wide execution counters and their Prometheus exposition.
//!
//! Counters are monotonic and never reset. They are plain atomics so any
//! number of request tasks can bump them without coordination.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub execs_total: u64,
    pub errors_total: u64,
}

/// Execution and error counters shared by the launcher and the handlers.
#[derive(Debug, Default)]
pub struct Metrics {
    execs_total: AtomicU64,
    errors_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one script invocation attempt.
    pub fn record_exec(&self) {
        self.execs_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one execution-layer error.
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            execs_total: self.execs_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
        }
    }

    /// Renders the counters in the Prometheus text format (0.0.4).
    pub fn render_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        out.push_str("# HELP shellhook_errors_total The total number of errors found\n");
        out.push_str("# TYPE shellhook_errors_total counter\n");
        out.push_str(&format!("shellhook_errors_total {}\n", snapshot.errors_total));
        out.push_str("# HELP shellhook_execs_total The total number of calls to exec\n");
        out.push_str("# TYPE shellhook_execs_total counter\n");
        out.push_str(&format!("shellhook_execs_total {}\n", snapshot.execs_total));
        out
    }
}
