//! Query Metrics
//!
//! Per-operation counters and latency tracking for similarity queries.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector
#[derive(Debug)]
pub struct Metrics {
    /// Total queries recorded
    total_ops: AtomicU64,

    /// Queries per operation name
    ops_by_kind: RwLock<HashMap<&'static str, u64>>,

    latency_sum_us: AtomicU64,
    latency_min_us: AtomicU64,
    latency_max_us: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            total_ops: AtomicU64::new(0),
            ops_by_kind: RwLock::new(HashMap::new()),
            latency_sum_us: AtomicU64::new(0),
            latency_min_us: AtomicU64::new(u64::MAX),
            latency_max_us: AtomicU64::new(0),
        }
    }

    /// Record one completed query
    pub fn record(&self, op: &'static str, latency: Duration) {
        self.total_ops.fetch_add(1, Ordering::Relaxed);
        *self.ops_by_kind.write().entry(op).or_insert(0) += 1;

        let latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.latency_min_us.fetch_min(latency_us, Ordering::Relaxed);
        self.latency_max_us.fetch_max(latency_us, Ordering::Relaxed);
    }

    pub fn total_ops(&self) -> u64 {
        self.total_ops.load(Ordering::Relaxed)
    }

    /// Count for one operation name
    pub fn ops(&self, op: &str) -> u64 {
        self.ops_by_kind.read().get(op).copied().unwrap_or(0)
    }

    /// Snapshot of counts per operation, sorted by name
    pub fn ops_by_kind(&self) -> Vec<(&'static str, u64)> {
        let mut ops: Vec<_> = self
            .ops_by_kind
            .read()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect();
        ops.sort_unstable();
        ops
    }

    /// Average latency in microseconds
    pub fn avg_latency_us(&self) -> f64 {
        let count = self.total_ops();
        if count == 0 {
            return 0.0;
        }
        self.latency_sum_us.load(Ordering::Relaxed) as f64 / count as f64
    }

    pub fn min_latency_us(&self) -> u64 {
        match self.latency_min_us.load(Ordering::Relaxed) {
            u64::MAX => 0,
            min => min,
        }
    }

    pub fn max_latency_us(&self) -> u64 {
        self.latency_max_us.load(Ordering::Relaxed)
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        let per_kind = self
            .ops_by_kind()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Queries: {} [{}] | Latency (µs): avg={:.1}, min={}, max={}",
            self.total_ops(),
            per_kind,
            self.avg_latency_us(),
            self.min_latency_us(),
            self.max_latency_us()
        )
    }
}
