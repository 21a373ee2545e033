use std::{sync::Arc, time::Duration};

use clap::Args;
use rama::error::BoxError;

use logwild_lib::{
    burst::{BurstConfig, BurstConfigBuilder, DEFAULT_PAYLOAD_SIZE, DEFAULT_TARGET_RATE},
    payload::PayloadKind,
    sink::{LogSink, SinkTarget},
};

/// Burst properties shared by the `run` and `burst` commands.
///
/// For the `run` command these act as the defaults of the loggen endpoint.
#[derive(Debug, Clone, Args)]
pub struct BurstArgs {
    /// target amount of log entries per second
    #[arg(long, value_name = "N", env = "LOGWILD_PER_SECOND", default_value_t = DEFAULT_TARGET_RATE)]
    pub per_second: u64,

    /// size in bytes of every log message
    #[arg(long, value_name = "BYTES", env = "LOGWILD_MESSAGE_SIZE", default_value_t = DEFAULT_PAYLOAD_SIZE)]
    pub message_size: usize,

    /// how long a burst runs, in seconds (e.g. `1.5`) or as humantime (e.g. `500ms`)
    #[arg(
        long,
        value_name = "DURATION",
        env = "LOGWILD_BURST_DUR",
        value_parser = parse_duration,
        default_value = "5s"
    )]
    pub burst_dur: Duration,

    /// destination of the generated logs: `-` (stdout), `tracing` or a file path
    #[arg(long, value_name = "- | tracing | <file>", env = "LOGWILD_OUT_FILE", default_value = "-")]
    pub out_file: SinkTarget,

    /// kind of message body to generate
    #[arg(long, value_enum, env = "LOGWILD_MESSAGE_KIND", default_value = "filler")]
    pub message_kind: PayloadKind,
}

impl BurstArgs {
    /// Builder pre-filled with these arguments and the given sink.
    ///
    /// The sink is opened by the caller, so a server can share it between runs.
    pub fn config_builder(&self, sink: Arc<dyn LogSink>) -> BurstConfigBuilder {
        BurstConfig::builder()
            .with_target_rate(self.per_second)
            .with_payload_size(self.message_size)
            .with_burst_duration(self.burst_dur)
            .with_sink(sink)
            .with_payload(self.message_kind.new_source())
    }
}

/// Parse a duration given as (fractional) seconds or as a humantime string.
pub fn parse_duration(s: &str) -> Result<Duration, BoxError> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|err| {
            BoxError::from(format!("invalid duration in seconds '{s}': {err}"))
        });
    }
    humantime::parse_duration(s)
        .map_err(|err| BoxError::from(format!("invalid duration '{s}': {err}")))
}
