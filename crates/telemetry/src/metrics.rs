//! In-memory counters for the sync pipeline.

use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Collected metrics for the sync pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Consumer metrics
    pub messages_processed: Counter,
    pub messages_ignored: Counter,
    pub messages_quarantined: Counter,
    pub consumer_restarts: Counter,

    // PDL enrichment metrics
    pub pdl_lookups: Counter,
    pub pdl_lookup_failures: Counter,

    // Retention metrics
    pub sykmeldinger_purged: Counter,
    pub sykmeldte_purged: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
