#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use rama::{error::BoxError, graceful, telemetry::tracing};

use clap::{Parser, Subcommand};
use logwild_lib::utils;
use parking_lot::Mutex;

pub mod cmd;
pub mod config;
pub mod server;

#[cfg(target_family = "unix")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(test)]
pub mod test;

/// CLI arguments for configuring logwild behavior.
#[derive(Debug, Clone, Parser)]
#[command(name = "logwild")]
#[command(bin_name = "logwild")]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    cmds: CliCommands,

    /// debug logging as default instead of Info; use RUST_LOG env for more options
    #[arg(
        long,
        short = 'v',
        alias = "debug",
        env = "LOGWILD_DEBUG",
        default_value_t = false,
        global = true
    )]
    pub verbose: bool,

    /// enable pretty logging (format for humans)
    #[arg(long, env = "LOGWILD_PRETTY", default_value_t = false, global = true)]
    pub pretty: bool,

    /// write the tracing output to the provided (log) file instead of stderr
    #[arg(long, short = 'o', env = "LOGWILD_OUTPUT", global = true)]
    pub output: Option<PathBuf>,

    /// directory in which data will be stored on the filesystem
    #[arg(
        long,
        short = 'D',
        env = "LOGWILD_DATA",
        default_value = ".logwild",
        global = true,
    )]
    pub data: PathBuf,

    #[arg(
        long,
        value_name = "SECONDS",
        env = "LOGWILD_GRACEFUL",
        default_value_t = 5.,
        global = true
    )]
    /// the graceful shutdown timeout (<= 0.0 = no timeout)
    pub graceful: f64,

    /// service name reported in the server lifetime span
    #[arg(
        long,
        value_name = "NAME",
        env = "LOGWILD_OTEL_SERVICE_NAME",
        default_value = utils::env::project_name(),
        global = true
    )]
    pub otel_service_name: String,
}

#[derive(Debug, Clone, Subcommand)]
#[allow(clippy::large_enum_variant)]
enum CliCommands {
    Run(self::cmd::run::RunCommand),
    Burst(self::cmd::burst::BurstCommand),
    Version(self::cmd::version::VersionCommand),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    utils::telemetry::init_tracing(utils::telemetry::TelemetryConfig {
        verbose: args.verbose,
        pretty: args.pretty,
        output: args.output.as_deref(),
    })?;

    let base_shutdown_signal = graceful::default_signal();
    if let Err(err) = run_with_args(base_shutdown_signal, args).await {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

/// Runs the selected logwild command and blocks until it finished,
/// a critical error occurred or the (graceful) shutdown has been initiated.
///
/// This entry point is used by both the (binary) `main` function as well as
/// for the e2e test suite found in the test module.
async fn run_with_args<F>(base_shutdown_signal: F, args: Args) -> Result<(), BoxError>
where
    F: Future<Output: Send + 'static> + Send + 'static,
{
    let graceful_timeout = (args.graceful > 0.).then(|| Duration::from_secs_f64(args.graceful));

    let failure: Arc<Mutex<Option<BoxError>>> = Default::default();

    let (error_tx, error_rx) = tokio::sync::oneshot::channel::<BoxError>();
    let graceful = graceful::Shutdown::new(new_shutdown_signal(
        error_rx,
        failure.clone(),
        base_shutdown_signal,
    ));

    graceful.spawn_task_fn(async move |guard| {
        let result = match args.cmds {
            CliCommands::Run(run_args) => {
                self::cmd::run::exec(args.data, args.otel_service_name, guard, run_args).await
            }
            CliCommands::Burst(burst_args) => self::cmd::burst::exec(guard, burst_args).await,
            CliCommands::Version(version_args) => self::cmd::version::exec(version_args),
        };
        if let Err(err) = result {
            let _ = error_tx.send(err);
        }
    });

    let delay = match graceful_timeout {
        Some(duration) => graceful.shutdown_with_limit(duration).await?,
        None => graceful.shutdown().await,
    };

    tracing::debug!("gracefully shutdown with a delay of: {delay:?}");

    match failure.lock().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn new_shutdown_signal(
    error_rx: tokio::sync::oneshot::Receiver<BoxError>,
    failure: Arc<Mutex<Option<BoxError>>>,
    base_shutdown_signal: impl Future<Output: Send + 'static> + Send + 'static,
) -> impl Future + Send + 'static {
    async move {
        tokio::select! {
            _ = base_shutdown_signal => {
                tracing::debug!("default signal triggered: init graceful shutdown");
            }
            result = error_rx => {
                match result {
                    Ok(err) => {
                        tracing::error!("fatal err received: {err}; abort");
                        *failure.lock() = Some(err);
                    },
                    Err(_) => {
                        tracing::debug!("command is finished without error, return control");
                    },
                }
            }
        }
    }
}
