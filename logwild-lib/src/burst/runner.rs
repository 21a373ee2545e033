use std::sync::Arc;

use rama::{
    rt::Executor,
    telemetry::tracing::{self, Instrument as _},
};
use tokio::{
    sync::oneshot,
    time::{Instant, MissedTickBehavior, interval_at, sleep_until},
};

use super::{BurstConfig, BurstError, BurstResult, Schedule, compute_schedule};
use crate::sink::LogEntry;

/// A burst that is configured but not yet running.
#[derive(Debug)]
pub struct BurstRunner {
    cfg: BurstConfig,
    schedule: Schedule,
}

impl BurstRunner {
    pub fn new(cfg: BurstConfig) -> Result<Self, BurstError> {
        let schedule = compute_schedule(cfg.target_rate(), cfg.min_granularity())?;
        Ok(Self { cfg, schedule })
    }

    #[inline(always)]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Start the burst as a task on the given executor.
    pub fn start(self, exec: Executor) -> BurstHandle {
        let Self { cfg, schedule } = self;
        let (tx, rx) = oneshot::channel();

        let span = tracing::debug_span!(
            "burst",
            target_rate = cfg.target_rate(),
            payload_size = cfg.payload_size(),
            burst_duration = ?cfg.burst_duration(),
            tick = ?schedule.tick_interval(),
            events_per_tick = schedule.events_per_tick(),
        );

        exec.spawn_task(
            async move {
                let result = run(&cfg, schedule).await;
                match &result {
                    Ok(result) => tracing::debug!(
                        emitted = result.emitted_count(),
                        elapsed = ?result.elapsed(),
                        "burst completed"
                    ),
                    Err(err) => tracing::debug!("burst failed: {err}"),
                }
                if tx.send(result).is_err() {
                    tracing::debug!("burst handle dropped before completion: result discarded");
                }
            }
            .instrument(span),
        );

        BurstHandle { schedule, rx }
    }
}

/// A running burst, owned by whoever started it.
#[derive(Debug)]
pub struct BurstHandle {
    schedule: Schedule,
    rx: oneshot::Receiver<Result<BurstResult, BurstError>>,
}

impl BurstHandle {
    #[inline(always)]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Wait for the burst to complete.
    pub async fn wait(self) -> Result<BurstResult, BurstError> {
        self.rx.await.unwrap_or(Err(BurstError::Aborted))
    }
}

/// Upper bound of entries written by a single blocking task.
///
/// The deadline is checked between chunks, so a batch overshoots it by at most one chunk.
const WRITE_CHUNK: u64 = 256;

async fn run(cfg: &BurstConfig, schedule: Schedule) -> Result<BurstResult, BurstError> {
    let start = Instant::now();
    let deadline = start
        .checked_add(cfg.burst_duration())
        .ok_or(BurstError::invalid("burst_duration", "exceeds the clock range"))?;

    let mut ticker = interval_at(start, schedule.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut emitted: u64 = 0;
    loop {
        tokio::select! {
            biased;

            _ = sleep_until(deadline) => break,
            _ = ticker.tick() => {
                let mut remaining = schedule.events_per_tick();
                while remaining > 0 {
                    let count = remaining.min(WRITE_CHUNK);
                    emitted = write_chunk(cfg, emitted, count).await?;
                    remaining -= count;

                    if remaining > 0 && Instant::now() >= deadline {
                        tracing::trace!(skipped = remaining, "deadline reached mid batch");
                        break;
                    }
                }
            }
        }
    }
    drop(ticker);

    let sink = Arc::clone(cfg.sink());
    tokio::task::spawn_blocking(move || sink.flush())
        .await
        .map_err(|err| {
            tracing::debug!("blocking flush task failed: {err}");
            BurstError::Aborted
        })?
        .map_err(|source| BurstError::Io { emitted, source })?;

    Ok(BurstResult::new(emitted, start.elapsed(), cfg))
}

/// Write `count` entries on the blocking pool, continuing after `emitted`.
///
/// Returns the new emitted count.
async fn write_chunk(cfg: &BurstConfig, emitted: u64, count: u64) -> Result<u64, BurstError> {
    let sink = Arc::clone(cfg.sink());
    let payload = Arc::clone(cfg.payload());
    let payload_size = cfg.payload_size();
    let span = tracing::Span::current();

    let (emitted, result) = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut emitted = emitted;
        for _ in 0..count {
            let entry = LogEntry::new(emitted + 1, payload.produce(payload_size));
            if let Err(err) = sink.write(entry) {
                return (emitted, Err(err));
            }
            emitted += 1;
        }
        (emitted, Ok(()))
    })
    .await
    .map_err(|err| {
        tracing::debug!("blocking write task failed: {err}");
        BurstError::Aborted
    })?;

    result.map_err(|source| BurstError::Io { emitted, source })?;
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicU64, Ordering},
        time::Duration,
    };

    use tokio::time;
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        payload::SentencePayload,
        sink::{FailingSink, FileSink, LogSink, MemorySink},
        utils::test::unique_empty_temp_dir,
    };

    fn config(rate: u64, size: usize, duration: Duration, sink: MemorySink) -> BurstConfig {
        BurstConfig::builder()
            .with_target_rate(rate)
            .with_payload_size(size)
            .with_burst_duration(duration)
            .with_sink(Arc::new(sink))
            .try_build()
            .unwrap()
    }

    async fn run_to_completion(cfg: BurstConfig) -> Result<BurstResult, BurstError> {
        BurstRunner::new(cfg)?.start(Executor::default()).wait().await
    }

    #[tokio::test(flavor = "current_thread")]
    async fn five_thousand_per_second_for_one_second() {
        time::pause();

        let sink = MemorySink::new();
        let cfg = config(5000, 64, Duration::from_secs(1), sink.clone());
        let result = run_to_completion(cfg).await.unwrap();

        let emitted = result.emitted_count();
        assert!((4975..=5025).contains(&emitted), "emitted: {emitted}");
        assert_eq!(emitted as usize, sink.len());
        assert!(result.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn run_ends_within_one_tick_of_deadline() {
        time::pause();

        let burst_duration = Duration::from_secs(1);
        let runner =
            BurstRunner::new(config(5000, 64, burst_duration, MemorySink::new())).unwrap();
        let tick = runner.schedule().tick_interval();

        let result = runner.start(Executor::default()).wait().await.unwrap();
        assert!(result.elapsed() >= burst_duration);
        assert!(
            result.elapsed() <= burst_duration + tick,
            "elapsed: {:?}",
            result.elapsed()
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn burst_shorter_than_one_tick_emits_a_single_batch() {
        time::pause();

        let sink = MemorySink::new();
        let burst_duration = Duration::from_millis(1);
        let runner = BurstRunner::new(config(5000, 64, burst_duration, sink.clone())).unwrap();
        let tick = runner.schedule().tick_interval();
        assert_eq!(Duration::from_millis(5), tick);

        let result = runner.start(Executor::default()).wait().await.unwrap();
        assert_eq!(25, result.emitted_count());
        assert_eq!(25, sink.len());
        assert!(result.elapsed() <= burst_duration + tick);
    }

    /// Sleeps (blocking the calling thread) before every write.
    struct SlowSink {
        inner: MemorySink,
        delay: Duration,
    }

    impl LogSink for SlowSink {
        fn write(&self, entry: LogEntry) -> io::Result<()> {
            std::thread::sleep(self.delay);
            self.inner.write(entry)
        }
    }

    fn slow_config(rate: u64, duration: Duration, sink: MemorySink) -> BurstConfig {
        BurstConfig::builder()
            .with_target_rate(rate)
            .with_payload_size(8)
            .with_burst_duration(duration)
            .with_sink(Arc::new(SlowSink {
                inner: sink,
                delay: Duration::from_micros(100),
            }))
            .try_build()
            .unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn batch_stops_at_deadline() {
        let sink = MemorySink::new();
        // 1000 events per 5ms tick, the first chunk alone outlasts the burst
        let runner =
            BurstRunner::new(slow_config(200_000, Duration::from_millis(20), sink.clone())).unwrap();
        assert_eq!(1000, runner.schedule().events_per_tick());

        let result = runner.start(Executor::default()).wait().await.unwrap();
        assert_eq!(WRITE_CHUNK, result.emitted_count());
        assert_eq!(WRITE_CHUNK as usize, sink.len());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn runtime_stays_responsive_during_batch() {
        let counter = Arc::new(AtomicU64::new(0));
        let ticker = tokio::spawn({
            let counter = counter.clone();
            async move {
                loop {
                    time::sleep(Duration::from_millis(1)).await;
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let cfg = slow_config(200_000, Duration::from_millis(20), MemorySink::new());
        run_to_completion(cfg).await.unwrap();
        ticker.abort();

        // the burst spent at least 25ms inside one blocking chunk
        assert!(counter.load(Ordering::Relaxed) >= 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn thousand_per_second_of_one_kib_for_five_seconds() {
        time::pause();

        let sink = MemorySink::new();
        let cfg = config(1000, 1024, Duration::from_secs(5), sink.clone());
        let report = run_to_completion(cfg).await.unwrap().report();

        assert!((4975..=5025).contains(&report.emitted_count));
        assert!((report.achieved_rate - 1000.).abs() < 10.);
        assert!((report.total_mb - 4.88).abs() < 0.03);
        assert!((report.achieved_throughput_mbps - 0.977).abs() < 0.01);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn entries_are_sequenced_and_sized() {
        time::pause();

        let sink = MemorySink::new();
        let cfg = config(4000, 64, Duration::from_secs(1), sink.clone());
        run_to_completion(cfg).await.unwrap();

        let entries = sink.entries();
        assert!(!entries.is_empty());
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(i as u64 + 1, entry.sequence);
            assert_eq!(64, entry.message.len());
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn low_rate_emits_one_event_per_tick() {
        time::pause();

        let sink = MemorySink::new();
        let cfg = config(1, 32, Duration::from_secs(1), sink.clone());
        let runner = BurstRunner::new(cfg).unwrap();
        assert_eq!(1, runner.schedule().events_per_tick());

        let result = runner.start(Executor::default()).wait().await.unwrap();
        assert_eq!(1, result.emitted_count());
        assert_eq!(1, sink.len());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn burst_does_not_finish_before_deadline() {
        time::pause();

        let sink = MemorySink::new();
        let cfg = config(100, 16, Duration::from_millis(100), sink.clone());
        let handle = BurstRunner::new(cfg).unwrap().start(Executor::default());

        let waiter = tokio::spawn(handle.wait());
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        time::advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        let result = waiter.await.unwrap().unwrap();
        assert_eq!(10, result.emitted_count());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_bursts_count_independently() {
        time::pause();

        let a = MemorySink::new();
        let b = MemorySink::new();

        let handle_a = BurstRunner::new(config(1000, 8, Duration::from_secs(1), a.clone()))
            .unwrap()
            .start(Executor::default());
        let handle_b = BurstRunner::new(config(200, 8, Duration::from_secs(1), b.clone()))
            .unwrap()
            .start(Executor::default());

        let (ra, rb) = tokio::join!(handle_a.wait(), handle_b.wait());
        let (ra, rb) = (ra.unwrap(), rb.unwrap());

        assert!((995..=1005).contains(&ra.emitted_count()));
        assert!((199..=201).contains(&rb.emitted_count()));
        assert_eq!(ra.emitted_count() as usize, a.len());
        assert_eq!(rb.emitted_count() as usize, b.len());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failing_sink_aborts_run_with_emitted_count() {
        time::pause();

        let sink = FailingSink::new(7);
        let cfg = BurstConfig::builder()
            .with_target_rate(1000)
            .with_payload_size(16)
            .with_burst_duration(Duration::from_secs(1))
            .with_sink(Arc::new(sink.clone()))
            .try_build()
            .unwrap();

        let err = run_to_completion(cfg).await.unwrap_err();
        match err {
            BurstError::Io { emitted, source } => {
                assert_eq!(7, emitted);
                assert_eq!(std::io::ErrorKind::StorageFull, source.kind());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(7, sink.written());
    }

    #[test]
    fn dropped_executor_runtime_aborts_run() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let sink = MemorySink::new();
        let cfg = config(10, 8, Duration::from_secs(60), sink);
        let handle = rt.block_on(async { BurstRunner::new(cfg).unwrap().start(Executor::default()) });
        drop(rt);

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt.block_on(handle.wait()).unwrap_err();
        assert!(matches!(err, BurstError::Aborted));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sequential_runs_append_to_file() {
        time::pause();

        let dir = unique_empty_temp_dir("logwild-runner-append").unwrap();
        let path = dir.join("out.log");
        let sink: Arc<FileSink> = Arc::new(FileSink::open(&path).unwrap());

        for _ in 0..2 {
            let cfg = BurstConfig::builder()
                .with_target_rate(1)
                .with_payload_size(32)
                .with_burst_duration(Duration::from_secs(1))
                .with_sink(sink.clone())
                .with_payload(Arc::new(SentencePayload::new()))
                .try_build()
                .unwrap();
            let result = run_to_completion(cfg).await.unwrap();
            assert_eq!(1, result.emitted_count());
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(2, lines.len());
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["seq"], 1);
            assert!(value["msg"].as_str().unwrap().ends_with('.'));
        }
    }

    #[tokio::test(flavor = "current_thread")]
    #[traced_test]
    async fn burst_runs_within_span() {
        time::pause();

        let cfg = config(10, 8, Duration::from_millis(100), MemorySink::new());
        run_to_completion(cfg).await.unwrap();

        assert!(logs_contain("burst completed"));
    }
}
