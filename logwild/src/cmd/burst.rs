use clap::Args;
use rama::{
    error::{BoxError, ErrorContext as _},
    graceful::ShutdownGuard,
    rt::Executor,
    telemetry::tracing,
};

use logwild_lib::{
    burst::{BurstReport, BurstRunner},
    sink::SinkTarget,
};

use crate::config::BurstArgs;

#[derive(Debug, Clone, Args)]
/// run a single burst and print its report
pub struct BurstCommand {
    #[command(flatten)]
    burst: BurstArgs,

    /// print the report as JSON instead of a human readable line
    #[arg(long, default_value_t = false)]
    json: bool,
}

pub async fn exec(guard: ShutdownGuard, args: BurstCommand) -> Result<(), BoxError> {
    let sink = args.burst.out_file.open()?;
    let cfg = args
        .burst
        .config_builder(sink)
        .try_build()
        .context("build burst configuration")?;

    let runner = BurstRunner::new(cfg).context("prepare burst runner")?;
    let schedule = runner.schedule();
    tracing::info!(
        per_second = args.burst.per_second,
        message_size = args.burst.message_size,
        burst_dur = ?args.burst.burst_dur,
        tick = ?schedule.tick_interval(),
        events_per_tick = schedule.events_per_tick(),
        "starting burst"
    );

    let result = runner
        .start(Executor::graceful(guard))
        .wait()
        .await
        .context("run burst")
        .with_context_field("sink", || args.burst.out_file.clone())?;

    print_report(&result.report(), &args.burst.out_file, args.json)
}

/// Write the report to stdout,
/// or to stderr when stdout already carries the generated logs.
#[allow(clippy::print_stdout)]
fn print_report(report: &BurstReport, sink: &SinkTarget, json: bool) -> Result<(), BoxError> {
    let rendered = if json {
        serde_json::to_string(report).context("serialize burst report")?
    } else {
        report.to_string()
    };

    if *sink == SinkTarget::Stdout {
        eprintln!("{rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}
