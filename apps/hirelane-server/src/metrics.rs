//! Prometheus metrics for hirelane-server.
//!
//! Exposes server metrics in Prometheus format at the `/metrics` endpoint
//! on the health listener.

use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder and return a handle for rendering.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    describe_counter!(
        "hirelane_http_requests_total",
        "Total number of HTTP requests processed"
    );
    describe_histogram!(
        "hirelane_http_request_duration_seconds",
        "Duration of HTTP requests in seconds"
    );

    handle
}

/// Axum middleware recording a counter and latency histogram per request.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "hirelane_http_requests_total",
        "method" => method.clone(),
        "status" => status
    )
    .increment(1);
    histogram!("hirelane_http_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());

    response
}
