//! Prometheus metrics for the pixel endpoint.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Pixel reads counter metric name.
pub const METRIC_PIXEL_READS: &str = "pixel_reads_total";
/// Pixel updates counter metric name.
pub const METRIC_PIXEL_UPDATES: &str = "pixel_updates_total";
/// Rejected or failed pixel requests counter metric name.
pub const METRIC_PIXEL_REJECTIONS: &str = "pixel_rejections_total";
/// Request latency metric name.
pub const METRIC_PIXEL_REQUEST_LATENCY: &str = "pixel_request_latency_ms";

/// Install the global Prometheus recorder and register descriptions.
/// Call this once at startup.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn describe_metrics() {
    describe_counter!(METRIC_PIXEL_READS, "Total number of pixel config reads");
    describe_counter!(METRIC_PIXEL_UPDATES, "Total number of accepted pixel updates");
    describe_counter!(
        METRIC_PIXEL_REJECTIONS,
        "Total number of pixel requests rejected or failed, by reason"
    );
    describe_histogram!(
        METRIC_PIXEL_REQUEST_LATENCY,
        "Pixel endpoint handling latency in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Increment pixel reads counter.
pub fn inc_pixel_reads() {
    counter!(METRIC_PIXEL_READS).increment(1);
}

/// Increment pixel updates counter.
pub fn inc_pixel_updates() {
    counter!(METRIC_PIXEL_UPDATES).increment(1);
}

/// Increment rejections counter for `reason`.
pub fn inc_pixel_rejections(reason: &'static str) {
    counter!(METRIC_PIXEL_REJECTIONS, "reason" => reason).increment(1);
}

/// RAII guard for timing a request.
/// Records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    method: &'static str,
}

impl LatencyTimer {
    /// Start timing a request for `method`.
    pub fn new(method: &'static str) -> Self {
        Self {
            start: Instant::now(),
            method,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(METRIC_PIXEL_REQUEST_LATENCY, "method" => self.method).record(self.elapsed_ms());
    }
}
