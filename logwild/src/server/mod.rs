use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use rama::{
    Layer as _,
    error::{BoxError, ErrorContext as _},
    graceful::ShutdownGuard,
    http::{
        HeaderValue,
        layer::{required_header::AddRequiredResponseHeadersLayer, trace::TraceLayer},
        server::HttpServer,
    },
    layer::TimeoutLayer,
    net::address::SocketAddress,
    rt::Executor,
    tcp::server::TcpListener,
    telemetry::tracing,
};

use logwild_lib::{sink::LogSink, utils::env::network_service_identifier};

use crate::cmd::run::RunCommand;

pub mod api;

/// Lifetime of a single client connection.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest burst a loggen request may ask for,
/// leaving headroom to flush the sink and send the report before the connection times out.
pub const MAX_HTTP_BURST_DURATION: Duration =
    CONNECTION_TIMEOUT.saturating_sub(Duration::from_secs(5));

pub async fn run_http_server(
    data: PathBuf,
    guard: ShutdownGuard,
    args: RunCommand,
    sink: Arc<dyn LogSink>,
) -> Result<(), BoxError> {
    let exec = Executor::graceful(guard.clone());

    let probes = api::Probes::new(!args.unhealthy, !args.unready);
    exec.spawn_task({
        let probes = probes.clone();
        let shutdown = guard.clone_weak();
        async move {
            shutdown.into_cancelled().await;
            probes.mark_down();
            tracing::debug!("shutdown initiated: liveness and readiness probes marked down");
        }
    });

    let state = api::AppState::new(args.burst.clone(), sink, exec.clone(), probes);

    let http_svc = (
        TraceLayer::new_for_http(),
        AddRequiredResponseHeadersLayer::new()
            .with_server_header_value(HeaderValue::from_static(network_service_identifier())),
    )
        .into_layer(api::router(state));

    let http_server = HttpServer::auto(exec.clone()).service(Arc::new(http_svc));
    let tcp_svc = TimeoutLayer::new(CONNECTION_TIMEOUT).into_layer(http_server);

    let tcp_listener = TcpListener::bind(args.bind, exec)
        .await
        .context("bind logwild http server")?;

    let server_addr = tcp_listener
        .local_addr()
        .context("get bound address for logwild http server")?;

    tracing::info!("http server bound to: {server_addr}");
    write_server_socket_address_as_file(&data, "http", server_addr.into()).await?;

    tcp_listener.serve(tcp_svc).await;

    Ok(())
}

async fn write_server_socket_address_as_file(
    dir: &Path,
    name: &str,
    addr: SocketAddress,
) -> Result<(), BoxError> {
    let path = dir.join(format!("{name}.addr.txt"));
    tokio::fs::write(&path, addr.to_string())
        .await
        .context("write server's socket address to file")
        .context_field("address", addr)
        .with_context_debug_field("path", || path.to_owned())
}
