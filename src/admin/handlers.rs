use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::rules::Rule;
use crate::stats::Stat;
use crate::surfaces::Summary;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub active_rules: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        active_rules: state.redirector.active_rules(),
    })
}

pub async fn get_rules(State(state): State<AppState>) -> Json<Vec<Rule>> {
    Json(state.manager.rules())
}

/// Stats ordered by descending count.
pub async fn get_stats(State(state): State<AppState>) -> Json<Vec<Stat>> {
    Json(state.manager.stats_sorted())
}

pub async fn get_summary(State(state): State<AppState>) -> Json<Summary> {
    Json(state.quick.summary())
}
