//! Request metrics: latency histogram plus total and error counters per
//! normalized route.
//!
//! Requests are labeled with the route template they matched, never the raw
//! URI, so the number of series is bounded by the router. Anything that
//! matched no route shares the [`UNMATCHED_ROUTE`] label.
//!
//! Every request is recorded exactly once. The recording lives in a drop
//! guard, so it runs whether the inner service returns a response, panics
//! (recorded and answered as 500) or is dropped because the client went away
//! (recorded as 499).

use axum::{
    extract::{MatchedPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use metrics::{
    Unit, counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use sysinfo::System;
use tokio::time::{MissedTickBehavior, interval};

use crate::error::AppError;

pub const REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_ERRORS: &str = "http_requests_errors_total";
pub const RATE_LIMIT_REJECTIONS: &str = "rate_limit_rejections_total";
pub const SYSTEM_CPU_USAGE: &str = "system_cpu_usage_percent";
pub const SYSTEM_MEMORY_USAGE: &str = "system_memory_usage_percent";

/// Replaces numeric path segments.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Path label of requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Non-standard status recorded when the client disconnects mid-request.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Installs the global Prometheus recorder and describes the metrics.
///
/// # Errors
///
/// Fails if a recorder is already installed in this process.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {e}"))?;

    describe_metrics();
    Ok(handle)
}

fn describe_metrics() {
    describe_histogram!(REQUEST_DURATION, Unit::Seconds, "HTTP request latency");
    describe_counter!(REQUESTS_TOTAL, "Total HTTP requests");
    describe_counter!(REQUEST_ERRORS, "HTTP requests answered with status >= 400");
    describe_counter!(RATE_LIMIT_REJECTIONS, "Requests rejected by the rate limiter");
    describe_gauge!(SYSTEM_CPU_USAGE, Unit::Percent, "System CPU usage in percent");
    describe_gauge!(SYSTEM_MEMORY_USAGE, Unit::Percent, "System memory usage in percent");
}

/// Publishes host CPU and memory usage gauges.
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Refreshes both gauges. CPU usage is measured since the previous call,
    /// so the first sample reads 0.
    pub fn sample(&mut self) {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        gauge!(SYSTEM_CPU_USAGE).set(f64::from(self.system.global_cpu_usage()));
        gauge!(SYSTEM_MEMORY_USAGE).set(memory_percent(
            self.system.used_memory(),
            self.system.total_memory(),
        ));
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn memory_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

/// Samples host usage every `every` until the process exits; spawn it with
/// `tokio::spawn`.
pub async fn run_system_sampler(every: Duration) {
    let mut sampler = SystemSampler::new();
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sampler.sample();
    }
}

/// Collapses purely numeric segments so `/api/cars/update/42` and
/// `/api/cars/update/7` share one series.
///
/// ```
/// use motorpool::api::middleware::metrics::normalize_route;
///
/// assert_eq!(normalize_route("/api/cars/delete/17"), "/api/cars/delete/{id}");
/// assert_eq!(normalize_route("/api/cars/list"), "/api/cars/list");
/// ```
pub fn normalize_route(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                ID_PLACEHOLDER
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The normalized route template of `req`, or [`UNMATCHED_ROUTE`].
fn route_label(req: &Request) -> String {
    req.extensions()
        .get::<MatchedPath>()
        .map(|matched| normalize_route(matched.as_str()))
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string())
}

/// Records one request when dropped.
struct RequestRecord {
    method: String,
    path: String,
    started: Instant,
    status: Option<u16>,
}

impl RequestRecord {
    fn start(method: &str, path: String) -> Self {
        Self {
            method: method.to_string(),
            path,
            started: Instant::now(),
            status: None,
        }
    }

    fn finish(mut self, status: u16) {
        self.status = Some(status);
    }
}

impl Drop for RequestRecord {
    fn drop(&mut self) {
        let status = self.status.unwrap_or(CLIENT_CLOSED_REQUEST);
        let elapsed = self.started.elapsed().as_secs_f64();

        histogram!(
            REQUEST_DURATION,
            "method" => self.method.clone(),
            "path" => self.path.clone()
        )
        .record(elapsed);

        counter!(
            REQUESTS_TOTAL,
            "method" => self.method.clone(),
            "path" => self.path.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        if status >= 400 {
            counter!(
                REQUEST_ERRORS,
                "method" => self.method.clone(),
                "path" => self.path.clone(),
                "status" => status.to_string()
            )
            .increment(1);
        }
    }
}

/// Middleware timing and recording every request.
///
/// A panic anywhere below this layer becomes a 500 response and is still
/// recorded; it never reaches the connection task.
///
/// Add it with `Router::layer` so routing has already set [`MatchedPath`].
pub async fn layer(req: Request, next: Next) -> Response {
    let record = RequestRecord::start(req.method().as_str(), route_label(&req));

    let response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(path = %record.path, "Handler panicked");
            AppError::internal("Internal server error").into_response()
        }
    };

    record.finish(response.status().as_u16());
    response
}

/// Prometheus scrape endpoint.
///
/// # Endpoint
///
/// `GET /metrics`
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
