//! Prometheus metrics for chat-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so library
//! code and tests never depend on global registration order.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    chat_requests_total: IntCounterVec,
    chat_upstream_latency_seconds: HistogramVec,
    chat_tokens_total: IntCounterVec,
}

impl Metrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;

        // outcome: success, service_unavailable, upstream_error, empty_response
        let chat_requests_total = IntCounterVec::new(
            Opts::new("chat_requests_total", "Total chat pipeline runs by outcome"),
            &["outcome"],
        )?;

        let chat_upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "chat_upstream_latency_seconds",
                "Gemini API latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["model"],
        )?;

        let chat_tokens_total = IntCounterVec::new(
            Opts::new("chat_tokens_total", "Total tokens processed"),
            &["model", "type"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(chat_requests_total.clone()))?;
        registry.register(Box::new(chat_upstream_latency_seconds.clone()))?;
        registry.register(Box::new(chat_tokens_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            chat_requests_total,
            chat_upstream_latency_seconds,
            chat_tokens_total,
        })
    }
}

/// Initialize all metrics. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = Metrics::build()?;
    if METRICS.set(metrics).is_ok() {
        tracing::info!("Prometheus metrics initialized");
    }
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let Some(metrics) = METRICS.get() else {
        tracing::error!("Metrics registry not initialized");
        return "# Metrics registry not initialized\n".to_string();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if let Err(e) = encoder.encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .http_requests_total
            .with_label_values(&[method, path, status])
            .inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&[method, path, status])
            .observe(duration_secs);
    }
}

/// Record the outcome of one chat pipeline run.
pub fn record_chat_outcome(outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics.chat_requests_total.with_label_values(&[outcome]).inc();
    }
}

/// Record Gemini round-trip latency.
pub fn record_upstream_latency(model: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .chat_upstream_latency_seconds
            .with_label_values(&[model])
            .observe(duration_secs);
    }
}

/// Record token usage reported by the model.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .chat_tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        metrics
            .chat_tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}
