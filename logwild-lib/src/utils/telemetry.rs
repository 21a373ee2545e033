use std::{fs::File, io::IsTerminal as _, path::Path};

use rama::{
    error::{BoxError, ErrorContext as _},
    telemetry::tracing::{
        self,
        metadata::LevelFilter,
        subscriber::{EnvFilter, fmt::writer::BoxMakeWriter},
    },
};

/// Where and how logwild reports on itself.
///
/// The diagnostics configured here are separate from the generated log traffic,
/// which always goes through a [`LogSink`](crate::sink::LogSink).
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig<'a> {
    pub verbose: bool,
    pub pretty: bool,
    pub output: Option<&'a Path>,
}

impl TelemetryConfig<'_> {
    /// Level used for every target `RUST_LOG` does not mention.
    pub fn default_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(self.default_level().into())
            .from_env_lossy()
    }

    fn ansi(&self) -> bool {
        self.output.is_none() && std::io::stderr().is_terminal()
    }

    fn make_writer(&self) -> Result<BoxMakeWriter, BoxError> {
        Ok(match self.output {
            Some(path) => BoxMakeWriter::new(open_log_file(path)?),
            None => BoxMakeWriter::new(std::io::stderr),
        })
    }
}

/// Diagnostics are appended, so restarts keep the history of earlier runs.
fn open_log_file(path: &Path) -> Result<File, BoxError> {
    std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .context("open diagnostics log file")
        .with_context_debug_field("path", || path.to_owned())
}

/// Install the global diagnostics subscriber.
///
/// `RUST_LOG` takes precedence over [`TelemetryConfig::default_level`],
/// e.g. `RUST_LOG=logwild_lib::burst=trace` to follow individual batches.
pub fn init_tracing(cfg: TelemetryConfig<'_>) -> Result<(), BoxError> {
    let subscriber = tracing::subscriber::fmt()
        .with_ansi(cfg.ansi())
        .with_env_filter(cfg.env_filter())
        .with_writer(cfg.make_writer()?);

    if cfg.pretty {
        subscriber.pretty().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    tracing::info!(
        level = %cfg.default_level(),
        output = ?cfg.output,
        "logwild diagnostics ready"
    );
    Ok(())
}
