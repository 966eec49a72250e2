//! Operational HTTP endpoints.
//!
//! - `/healthz`         : liveness
//! - `/metrics`         : Prometheus text format
//! - `/v1/policy/stats` : JSON snapshot using management attribute names

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.engine().snapshot().render();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn policy_stats(State(state): State<AppState>) -> Response {
    Json(state.engine().snapshot()).into_response()
}
