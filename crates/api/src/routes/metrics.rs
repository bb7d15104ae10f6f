//! Prometheus scrape endpoint.
//!
//! Exposes the `projections_events_{applied,ignored,failed}` and
//! `projections_models_purged` counters, labelled by model, and the
//! `api_events_received` ingest counter.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// GET /metrics
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], handle.render())
}
