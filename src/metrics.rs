//! Submission counters and prediction latency tracking.

use crate::submission::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

const LATENCY_WINDOW: usize = 10_000;

/// Metrics collector for the prediction service.
///
/// Only observes outcomes; predictions never read from it.
pub struct ServiceMetrics {
    pub submissions: AtomicU64,
    pub estimates: AtomicU64,
    pub warnings: AtomicU64,
    pub failures: AtomicU64,
    /// Prediction latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            estimates: AtomicU64::new(0),
            warnings: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record one handled submission
    pub fn record(&self, outcome: &Outcome, elapsed: Duration) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::Estimate(_) => &self.estimates,
            Outcome::Warning(_) => &self.warnings,
            Outcome::Failed(_) => &self.failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.latencies.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep the window bounded
            if times.len() > LATENCY_WINDOW {
                times.drain(0..LATENCY_WINDOW / 2);
            }
        }
    }

    /// Latency statistics over the current window
    pub fn latency_stats(&self) -> LatencyStats {
        let mut sorted = match self.latencies.read() {
            Ok(times) => times.clone(),
            Err(_) => return LatencyStats::default(),
        };
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.5),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Submissions per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.submissions.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        let latency = self.latency_stats();
        info!(
            submissions = self.submissions.load(Ordering::Relaxed),
            estimates = self.estimates.load(Ordering::Relaxed),
            warnings = self.warnings.load(Ordering::Relaxed),
            failures = self.failures.load(Ordering::Relaxed),
            throughput = format!("{:.2} req/s", self.throughput()),
            mean_us = latency.mean_us,
            p50_us = latency.p50_us,
            p95_us = latency.p95_us,
            p99_us = latency.p99_us,
            max_us = latency.max_us,
            "Prediction service summary"
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Logs a summary at a fixed interval
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting loop
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostEstimate;

    #[test]
    fn test_outcome_counters() {
        let metrics = ServiceMetrics::new();

        metrics.record(
            &Outcome::Estimate(CostEstimate::new(5000.0)),
            Duration::from_micros(100),
        );
        metrics.record(&Outcome::Warning("age".to_string()), Duration::from_micros(5));
        metrics.record(&Outcome::Failed("boom".to_string()), Duration::from_micros(300));

        assert_eq!(metrics.submissions.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.estimates.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.warnings.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.latency_stats(), LatencyStats::default());

        for us in 1..=100 {
            metrics.record(
                &Outcome::Estimate(CostEstimate::new(1.0)),
                Duration::from_micros(us),
            );
        }

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.max_us, 100);
        assert_eq!(stats.p50_us, 51);
        assert_eq!(stats.mean_us, 50);
    }

    #[test]
    fn test_window_is_bounded() {
        let metrics = ServiceMetrics::new();
        for _ in 0..(LATENCY_WINDOW + 1) {
            metrics.record(&Outcome::Warning(String::new()), Duration::from_micros(1));
        }
        assert!(metrics.latency_stats().count <= LATENCY_WINDOW as u64);
    }
}
