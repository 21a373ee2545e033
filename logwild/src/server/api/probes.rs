use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rama::http::{
    StatusCode,
    service::web::{
        extract::State,
        response::{IntoResponse, Json},
    },
};

use super::AppState;

/// Liveness and readiness state of the server.
#[derive(Debug, Clone)]
pub struct Probes {
    healthy: Arc<AtomicBool>,
    ready: Arc<AtomicBool>,
}

impl Probes {
    pub fn new(healthy: bool, ready: bool) -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(healthy)),
            ready: Arc::new(AtomicBool::new(ready)),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Fail both probes, used once shutdown started.
    pub fn mark_down(&self) {
        self.healthy.store(false, Ordering::Release);
        self.ready.store(false, Ordering::Release);
    }
}

fn probe_response(ok: bool) -> impl IntoResponse {
    if ok {
        (StatusCode::OK, Json(serde_json::json!({"status": "OK"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "UNAVAILABLE"})),
        )
    }
}

pub(super) async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    probe_response(state.probes.is_healthy())
}

pub(super) async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    probe_response(state.probes.is_ready())
}

pub(super) async fn enable_ready(State(state): State<AppState>) -> impl IntoResponse {
    state.probes.set_ready(true);
    StatusCode::ACCEPTED
}

pub(super) async fn disable_ready(State(state): State<AppState>) -> impl IntoResponse {
    state.probes.set_ready(false);
    StatusCode::ACCEPTED
}
