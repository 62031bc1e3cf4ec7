//! Request metrics and statistics tracking for the prediction service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for prediction requests
pub struct RequestMetrics {
    /// Total successful predictions served
    pub predictions_served: AtomicU64,
    /// Total failed predictions
    pub predictions_failed: AtomicU64,
    /// Failures by backend label
    failures_by_backend: RwLock<HashMap<String, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl RequestMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            predictions_failed: AtomicU64::new(0),
            failures_by_backend: RwLock::new(HashMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, latency: Duration) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if latencies.len() > 10000 {
                latencies.drain(0..5000);
            }
        }
    }

    /// Record a failed prediction
    pub fn record_failure(&self, backend: &str) {
        self.predictions_failed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_backend) = self.failures_by_backend.write() {
            *by_backend.entry(backend.to_string()).or_insert(0) += 1;
        }
    }

    /// Get request latency statistics
    pub fn get_latency_stats(&self) -> LatencyStats {
        let latencies = self.latencies.read().unwrap();
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted: Vec<u64> = latencies.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get failure counts by backend
    pub fn get_failures_by_backend(&self) -> HashMap<String, u64> {
        self.failures_by_backend.read().unwrap().clone()
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let failed = self.predictions_failed.load(Ordering::Relaxed);
        let latency = self.get_latency_stats();

        info!(
            predictions_served = served,
            predictions_failed = failed,
            throughput = format!("{:.1} req/s", self.get_throughput()),
            latency_mean_us = latency.mean_us,
            latency_p50_us = latency.p50_us,
            latency_p95_us = latency.p95_us,
            latency_p99_us = latency.p99_us,
            "Prediction service metrics summary"
        );

        let failures = self.get_failures_by_backend();
        for (backend, count) in &failures {
            info!(backend = %backend, failures = count, "Backend failure count");
        }
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Request latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that logs periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<RequestMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<RequestMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = RequestMetrics::new();

        metrics.record_prediction(Duration::from_micros(100));
        metrics.record_prediction(Duration::from_micros(200));
        metrics.record_failure("gateway");

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.predictions_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_failures_by_backend().get("gateway"), Some(&1));
    }

    #[test]
    fn test_latency_stats() {
        let metrics = RequestMetrics::new();

        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us));
        }

        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }

    #[test]
    fn test_empty_stats() {
        let metrics = RequestMetrics::new();
        let stats = metrics.get_latency_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean_us, 0);
    }
}
