use axum::extract::{MatchedPath, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Registry, TextEncoder};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::warn;

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}
static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static CACHE_LOOKUPS: OnceLock<IntCounterVec> = OnceLock::new();
static ANALYSIS_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();
static ANALYSIS_DURATION: OnceLock<Histogram> = OnceLock::new();

pub fn init_metrics() {
    if let Err(e) = register_all() {
        warn!("Failed to register metrics: {}", e);
    }
}

fn register_all() -> prometheus::Result<()> {
    if REQ_COUNTER.get().is_none() {
        let counter = IntCounterVec::new(
            prometheus::opts!("requests_total", "Total requests per route"),
            &["route", "status"],
        )?;
        REGISTRY.register(Box::new(counter.clone()))?;
        let _ = REQ_COUNTER.set(counter);
    }

    if CACHE_LOOKUPS.get().is_none() {
        let counter = IntCounterVec::new(
            prometheus::opts!("analysis_cache_lookups_total", "Result cache lookups by outcome"),
            &["result"],
        )?;
        REGISTRY.register(Box::new(counter.clone()))?;
        let _ = CACHE_LOOKUPS.set(counter);
    }

    if ANALYSIS_FAILURES.get().is_none() {
        let counter = IntCounterVec::new(
            prometheus::opts!("analysis_failures_total", "Failed analyses by error kind"),
            &["kind"],
        )?;
        REGISTRY.register(Box::new(counter.clone()))?;
        let _ = ANALYSIS_FAILURES.set(counter);
    }

    if ANALYSIS_DURATION.get().is_none() {
        let histogram = Histogram::with_opts(
            HistogramOpts::new("analysis_duration_seconds", "Time spent generating one analysis")
                .buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0]),
        )?;
        REGISTRY.register(Box::new(histogram.clone()))?;
        let _ = ANALYSIS_DURATION.set(histogram);
    }

    Ok(())
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn record_cache_lookup(hit: bool) {
    if let Some(counter) = CACHE_LOOKUPS.get() {
        counter.with_label_values(&[if hit { "hit" } else { "miss" }]).inc();
    }
}

pub fn inc_analysis_failure(kind: &str) {
    if let Some(counter) = ANALYSIS_FAILURES.get() {
        counter.with_label_values(&[kind]).inc();
    }
}

pub fn observe_analysis_duration(seconds: f64) {
    if let Some(histogram) = ANALYSIS_DURATION.get() {
        histogram.observe(seconds);
    }
}

/// Count every request by matched route and status
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    tracing::debug!("{} answered {} in {:?}", route, response.status(), start.elapsed());

    inc_request(&route, response.status().as_str());
    response
}

pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}
