use rama::http::service::web::response::{IntoResponse, Json};
use serde::Serialize;

use logwild_lib::utils::env;

#[derive(Debug, Serialize)]
pub(super) struct RuntimeInfo {
    hostname: String,
    version: &'static str,
    revision: &'static str,
    os: &'static str,
    arch: &'static str,
    runtime: &'static str,
    num_cpu: usize,
}

impl RuntimeInfo {
    fn current() -> Self {
        Self {
            hostname: env::hostname(),
            version: env::project_version(),
            revision: env::project_revision(),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            runtime: "tokio",
            num_cpu: env::available_cpu_count(),
        }
    }
}

pub(super) async fn info() -> impl IntoResponse {
    Json(RuntimeInfo::current())
}

pub(super) async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env::project_version(),
        "revision": env::project_revision(),
    }))
}

/// Process environment as `KEY=VALUE` entries.
pub(super) async fn env() -> impl IntoResponse {
    let vars: Vec<String> = std::env::vars_os()
        .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
        .collect();
    Json(vars)
}
