//! Pipeline metrics for observability
//!
//! Counters describing what happened to records after they passed the
//! level check: how many reached a renderer successfully and how many were
//! lost to renderer errors or panics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a handler tree
///
/// A handler and every sub-handler derived from it share one instance.
///
/// # Example
///
/// ```
/// use context_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_emitted();
/// metrics.record_render_failure();
///
/// assert_eq!(metrics.records_emitted(), 1);
/// assert_eq!(metrics.render_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records the renderer accepted
    records_emitted: AtomicU64,

    /// Records the renderer rejected with an error
    render_failures: AtomicU64,

    /// Records during which the renderer panicked
    render_panics: AtomicU64,

    /// Attribute values replaced because resolving them panicked
    value_panics: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_emitted: AtomicU64::new(0),
            render_failures: AtomicU64::new(0),
            render_panics: AtomicU64::new(0),
            value_panics: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn render_failures(&self) -> u64 {
        self.render_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn render_panics(&self) -> u64 {
        self.render_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn value_panics(&self) -> u64 {
        self.value_panics.load(Ordering::Relaxed)
    }

    /// Records lost for any reason
    #[inline]
    pub fn records_lost(&self) -> u64 {
        self.render_failures() + self.render_panics()
    }

    /// Record a successfully rendered record, returns the previous count
    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.records_emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_render_failure(&self) -> u64 {
        self.render_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_render_panic(&self) -> u64 {
        self.render_panics.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_value_panic(&self) -> u64 {
        self.value_panics.fetch_add(1, Ordering::Relaxed)
    }

    /// Loss rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no records have been handled.
    pub fn loss_rate(&self) -> f64 {
        let lost = self.records_lost() as f64;
        let total = self.records_emitted() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_emitted.store(0, Ordering::Relaxed);
        self.render_failures.store(0, Ordering::Relaxed);
        self.render_panics.store(0, Ordering::Relaxed);
        self.value_panics.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_emitted: AtomicU64::new(self.records_emitted()),
            render_failures: AtomicU64::new(self.render_failures()),
            render_panics: AtomicU64::new(self.render_panics()),
            value_panics: AtomicU64::new(self.value_panics()),
        }
    }
}
