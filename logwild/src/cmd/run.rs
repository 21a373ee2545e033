use std::{path::PathBuf, sync::Arc};

use clap::Args;
use rama::{
    error::{BoxError, ErrorContext as _},
    graceful::ShutdownGuard,
    net::socket::Interface,
    telemetry::tracing::{self, Instrument as _},
};

use crate::{config::BurstArgs, server};

#[derive(Debug, Clone, Args)]
/// serve the logwild HTTP API
pub struct RunCommand {
    /// network interface to bind the http server to
    #[arg(
        long,
        short = 'b',
        value_name = "INTERFACE",
        env = "LOGWILD_BIND",
        default_value = "127.0.0.1:8888"
    )]
    pub bind: Interface,

    #[command(flatten)]
    pub burst: BurstArgs,

    /// start with the liveness probe failing
    #[arg(long, env = "LOGWILD_UNHEALTHY", default_value_t = false)]
    pub unhealthy: bool,

    /// start with the readiness probe failing
    #[arg(long, env = "LOGWILD_UNREADY", default_value_t = false)]
    pub unready: bool,
}

pub async fn exec(
    data: PathBuf,
    service_name: String,
    guard: ShutdownGuard,
    args: RunCommand,
) -> Result<(), BoxError> {
    tokio::fs::create_dir_all(&data)
        .await
        .context("create data directory")
        .with_context_debug_field("path", || data.clone())?;
    tracing::info!(path = ?data, "data directory ready to be used");

    let sink = args.burst.out_file.open()?;
    args.burst
        .config_builder(Arc::clone(&sink))
        .validate()
        .context("validate loggen defaults")?;
    if args.burst.burst_dur > server::MAX_HTTP_BURST_DURATION {
        return Err(BoxError::from(format!(
            "default burst duration {:?} exceeds the maximum of {:?} for bursts over http",
            args.burst.burst_dur,
            server::MAX_HTTP_BURST_DURATION,
        )));
    }
    tracing::info!(out_file = %args.burst.out_file, "log sink ready to be used");

    tracing::info!("spawning http server...");
    server::run_http_server(data, guard, args, sink)
        .instrument(tracing::debug_span!(
            "http server lifetime",
            server.service.name = %service_name,
            otel.kind = "server",
            network.protocol.name = "http",
        ))
        .await
}
