use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use super::AppState;

#[derive(Serialize)]
pub(super) struct Keepalive {
    ok: bool,
    ts: i64,
}

/// One-row query so the hosted database is not paused for inactivity.
pub(super) async fn ping(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Keepalive>) {
    let result = state.repo.ping().await;
    let ts = Utc::now().timestamp_millis();
    match result {
        Ok(()) => (StatusCode::OK, Json(Keepalive { ok: true, ts })),
        Err(e) => {
            error!("Keepalive error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Keepalive { ok: false, ts }),
            )
        }
    }
}
