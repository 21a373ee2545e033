use std::{fmt, time::Duration};

use serde::Serialize;

use super::BurstConfig;

const BYTES_PER_MB: f64 = 1024. * 1024.;

/// Outcome of a completed burst run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstResult {
    emitted_count: u64,
    elapsed: Duration,
    target_rate: u64,
    payload_size: usize,
    burst_duration: Duration,
}

impl BurstResult {
    pub(super) fn new(emitted_count: u64, elapsed: Duration, cfg: &BurstConfig) -> Self {
        Self {
            emitted_count,
            elapsed,
            target_rate: cfg.target_rate(),
            payload_size: cfg.payload_size(),
            burst_duration: cfg.burst_duration(),
        }
    }

    #[inline(always)]
    pub fn emitted_count(&self) -> u64 {
        self.emitted_count
    }

    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Entries per second, zero when no time elapsed.
    pub fn achieved_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0. {
            0.
        } else {
            self.emitted_count as f64 / secs
        }
    }

    /// Payload bytes per second.
    pub fn achieved_throughput(&self) -> f64 {
        self.achieved_rate() * self.payload_size as f64
    }

    pub fn report(&self) -> BurstReport {
        report(self, self.payload_size)
    }
}

/// Serializable throughput summary of a burst.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BurstReport {
    pub emitted_count: u64,
    pub elapsed_ms: u64,
    pub achieved_rate: f64,
    pub achieved_throughput_mbps: f64,
    pub total_mb: f64,
    pub target_rate: u64,
    pub payload_size: usize,
    pub burst_duration_ms: u64,
}

pub fn report(result: &BurstResult, payload_size: usize) -> BurstReport {
    let achieved_rate = result.achieved_rate();
    BurstReport {
        emitted_count: result.emitted_count,
        elapsed_ms: duration_ms(result.elapsed),
        achieved_rate,
        achieved_throughput_mbps: achieved_rate * payload_size as f64 / BYTES_PER_MB,
        total_mb: result.emitted_count as f64 * payload_size as f64 / BYTES_PER_MB,
        target_rate: result.target_rate,
        payload_size,
        burst_duration_ms: duration_ms(result.burst_duration),
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl fmt::Display for BurstReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "emitted {} entries of {} bytes in {} ms ({:.2}/s of {}/s target, {:.3} MB/s, {:.2} MB total)",
            self.emitted_count,
            self.payload_size,
            self.elapsed_ms,
            self.achieved_rate,
            self.target_rate,
            self.achieved_throughput_mbps,
            self.total_mb,
        )
    }
}
