//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::job::{JobSnapshot, JobStatus, ScanJob};
use crate::engine::SetProfitEngine;
use crate::market::ClientStats;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub engine: SetProfitEngine,
    pub job: Arc<ScanJob>,
}

impl DashboardState {
    pub fn new(engine: SetProfitEngine) -> Self {
        Self {
            engine,
            job: Arc::new(ScanJob::new()),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    /// "started" or "running".
    pub status: String,
    pub message: String,
    pub scan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub scan_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result_count: usize,
    pub best_profit: Option<i64>,
    pub market: String,
    pub client: ClientStats,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/scan
///
/// Starts a background scan unless one is already running.
pub async fn start_scan(State(state): State<AppState>) -> Json<ScanResponse> {
    let Some(ticket) = state.job.try_start() else {
        return Json(ScanResponse {
            status: "running".into(),
            message: "Scan already in progress...".into(),
            scan_id: state.job.snapshot().scan_id,
        });
    };

    let scan_id = ticket.scan_id();
    let worker = state.clone();

    tokio::spawn(async move {
        info!(%scan_id, "Scan task started");
        let results = worker
            .engine
            .run_scan(|snapshot| ticket.publish(snapshot))
            .await;
        info!(%scan_id, found = results.len(), "Scan task finished");
        ticket.finish(results);
    });

    Json(ScanResponse {
        status: "started".into(),
        message: "Scan started!".into(),
        scan_id: Some(scan_id),
    })
}

/// GET /api/results
pub async fn get_results(State(state): State<AppState>) -> Json<JobSnapshot> {
    Json(state.job.snapshot())
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snap = state.job.snapshot();
    let api = state.engine.api();

    Json(StatusResponse {
        status: snap.status,
        scan_id: snap.scan_id,
        started_at: snap.started_at,
        finished_at: snap.finished_at,
        result_count: snap.results.len(),
        best_profit: snap.results.iter().map(|r| r.profit).max(),
        market: api.name().to_string(),
        client: api.stats(),
    })
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
