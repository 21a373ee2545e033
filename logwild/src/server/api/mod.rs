//! The logwild HTTP API.
//!
//! `GET /api/loggen` runs one burst per request and replies with its report.
//! The remaining endpoints expose runtime info, probes and counters.

use std::{convert::Infallible, sync::Arc};

use rama::{
    Service,
    http::{Request, Response, service::web::Router},
    rt::Executor,
};

use logwild_lib::sink::LogSink;

use crate::config::BurstArgs;

mod info;
mod loggen;
mod metrics;
mod probes;

pub use self::{
    loggen::{LoggenParams, ParameterParseError},
    metrics::Metrics,
    probes::Probes,
};

/// State shared by all API handlers.
#[derive(Clone)]
pub struct AppState {
    defaults: Arc<BurstArgs>,
    sink: Arc<dyn LogSink>,
    exec: Executor,
    probes: Probes,
    metrics: Metrics,
}

impl AppState {
    pub fn new(defaults: BurstArgs, sink: Arc<dyn LogSink>, exec: Executor, probes: Probes) -> Self {
        Self {
            defaults: Arc::new(defaults),
            sink,
            exec,
            probes,
            metrics: Metrics::default(),
        }
    }
}

pub fn router(state: AppState) -> impl Service<Request, Output = Response, Error = Infallible> + Clone {
    Arc::new(
        Router::new_with_state(state)
            .with_get("/", info::info)
            .with_get("/api/info", info::info)
            .with_get("/api/loggen", loggen::loggen)
            .with_get("/version", info::version)
            .with_get("/env", info::env)
            .with_get("/healthz", probes::healthz)
            .with_get("/readyz", probes::readyz)
            .with_post("/readyz/enable", probes::enable_ready)
            .with_post("/readyz/disable", probes::disable_ready)
            .with_get("/metrics", metrics::metrics),
    )
}
