use std::time::Duration;

use super::BurstError;

/// Practical floor of most OS timer implementations.
pub const DEFAULT_MIN_GRANULARITY: Duration = Duration::from_millis(5);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Tick based emission schedule derived from a target rate.
///
/// Every `tick_interval` the runner emits `events_per_tick` entries.
/// When the per-event interval would be finer than the timer granularity,
/// events are batched per tick so the long term average still matches
/// the target rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    tick_interval: Duration,
    events_per_tick: u64,
}

impl Schedule {
    #[inline(always)]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[inline(always)]
    pub fn events_per_tick(&self) -> u64 {
        self.events_per_tick
    }

    /// Events per second this schedule produces in the long run.
    pub fn effective_rate(&self) -> f64 {
        self.events_per_tick as f64 / self.tick_interval.as_secs_f64()
    }

    /// Number of ticks that fire within `duration`, counting the one at t=0.
    pub fn ticks_within(&self, duration: Duration) -> u64 {
        let tick = self.tick_interval.as_nanos();
        duration.as_nanos().div_ceil(tick) as u64
    }
}

/// Compute the schedule for `target_rate` events per second,
/// given a timer that can not reliably fire more often than `min_granularity`.
///
/// Events are batched per tick when `1 / target_rate` is below the granularity.
/// The batch size is rounded up and the tick interval stretched to match it,
/// which keeps the long term rate exact and never fires faster than the floor.
/// For any rate where `target_rate * min_granularity` is integral the tick
/// interval equals `min_granularity`. Otherwise the tick interval is longer
/// than `min_granularity`: 250 events/s at 5ms becomes 2 events every 8ms.
pub fn compute_schedule(
    target_rate: u64,
    min_granularity: Duration,
) -> Result<Schedule, BurstError> {
    if target_rate == 0 {
        return Err(BurstError::invalid("target_rate", "must be positive"));
    }
    if min_granularity.is_zero() {
        return Err(BurstError::invalid("min_granularity", "must be positive"));
    }

    let rate = target_rate as u128;
    let granularity = min_granularity.as_nanos();

    // 1/rate < granularity  <=>  rate * granularity > 1s
    if rate * granularity <= NANOS_PER_SEC {
        return Ok(Schedule {
            tick_interval: nanos_to_duration(NANOS_PER_SEC / rate),
            events_per_tick: 1,
        });
    }

    let events_per_tick = (rate * granularity).div_ceil(NANOS_PER_SEC).max(1);
    let tick_nanos = (events_per_tick * NANOS_PER_SEC / rate).max(granularity);

    Ok(Schedule {
        tick_interval: nanos_to_duration(tick_nanos),
        events_per_tick: u64::try_from(events_per_tick).unwrap_or(u64::MAX),
    })
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = (nanos / NANOS_PER_SEC) as u64;
    let sub_nanos = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, sub_nanos)
}
