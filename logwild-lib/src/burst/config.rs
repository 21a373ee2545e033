use std::{fmt, sync::Arc, time::Duration};

use crate::{
    payload::{FillerPayload, PayloadSource},
    sink::{LogSink, StdoutSink},
};

use super::{BurstError, DEFAULT_MIN_GRANULARITY};

pub const DEFAULT_TARGET_RATE: u64 = 1000;
pub const DEFAULT_PAYLOAD_SIZE: usize = 2048;
pub const DEFAULT_BURST_DURATION: Duration = Duration::from_secs(5);

/// Upper bounds keep a single tick's batch and every message allocation bounded.
pub const MAX_TARGET_RATE: u64 = 1_000_000;
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;
pub const MAX_BURST_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
pub const MAX_MIN_GRANULARITY: Duration = Duration::from_secs(1);

/// Fully resolved, validated configuration of a single burst.
///
/// Only obtainable through [`BurstConfigBuilder::try_build`].
#[derive(Clone)]
pub struct BurstConfig {
    target_rate: u64,
    payload_size: usize,
    burst_duration: Duration,
    min_granularity: Duration,
    sink: Arc<dyn LogSink>,
    payload: Arc<dyn PayloadSource>,
}

impl BurstConfig {
    pub fn builder() -> BurstConfigBuilder {
        BurstConfigBuilder::default()
    }

    #[inline(always)]
    pub fn target_rate(&self) -> u64 {
        self.target_rate
    }

    #[inline(always)]
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    #[inline(always)]
    pub fn burst_duration(&self) -> Duration {
        self.burst_duration
    }

    #[inline(always)]
    pub fn min_granularity(&self) -> Duration {
        self.min_granularity
    }

    pub(super) fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    pub(super) fn payload(&self) -> &Arc<dyn PayloadSource> {
        &self.payload
    }
}

impl fmt::Debug for BurstConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BurstConfig")
            .field("target_rate", &self.target_rate)
            .field("payload_size", &self.payload_size)
            .field("burst_duration", &self.burst_duration)
            .field("min_granularity", &self.min_granularity)
            .finish()
    }
}

/// Builder for [`BurstConfig`].
///
/// Unset properties use the logwild defaults:
/// 1000 events/s of 2048 bytes for 5 seconds, written to stdout.
#[derive(Default, Clone)]
pub struct BurstConfigBuilder {
    target_rate: Option<u64>,
    payload_size: Option<usize>,
    burst_duration: Option<Duration>,
    min_granularity: Option<Duration>,
    sink: Option<Arc<dyn LogSink>>,
    payload: Option<Arc<dyn PayloadSource>>,
}

impl BurstConfigBuilder {
    rama::utils::macros::generate_set_and_with! {
        /// Target amount of log events per second.
        pub fn target_rate(mut self, target_rate: u64) -> Self {
            self.target_rate = Some(target_rate);
            self
        }
    }

    rama::utils::macros::generate_set_and_with! {
        /// Approximate size in bytes of every log message.
        pub fn payload_size(mut self, payload_size: usize) -> Self {
            self.payload_size = Some(payload_size);
            self
        }
    }

    rama::utils::macros::generate_set_and_with! {
        /// How long the burst runs.
        pub fn burst_duration(mut self, burst_duration: Duration) -> Self {
            self.burst_duration = Some(burst_duration);
            self
        }
    }

    rama::utils::macros::generate_set_and_with! {
        /// Finest timer interval the scheduler may rely on.
        pub fn min_granularity(mut self, min_granularity: Duration) -> Self {
            self.min_granularity = Some(min_granularity);
            self
        }
    }

    rama::utils::macros::generate_set_and_with! {
        /// Destination of the generated log entries.
        pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
            self.sink = Some(sink);
            self
        }
    }

    rama::utils::macros::generate_set_and_with! {
        /// Source of the log message bodies.
        pub fn payload(mut self, payload: Arc<dyn PayloadSource>) -> Self {
            self.payload = Some(payload);
            self
        }
    }

    /// Validate the collected properties and resolve defaults.
    pub fn validate(&self) -> Result<(), BurstError> {
        match self.target_rate {
            Some(0) => return Err(BurstError::invalid("target_rate", "must be positive")),
            Some(rate) if rate > MAX_TARGET_RATE => {
                return Err(BurstError::invalid(
                    "target_rate",
                    "must not exceed 1000000 per second",
                ));
            }
            _ => (),
        }
        match self.payload_size {
            Some(0) => return Err(BurstError::invalid("payload_size", "must be positive")),
            Some(size) if size > MAX_PAYLOAD_SIZE => {
                return Err(BurstError::invalid(
                    "payload_size",
                    "must not exceed 1 MiB",
                ));
            }
            _ => (),
        }
        match self.burst_duration {
            Some(d) if d.is_zero() => {
                return Err(BurstError::invalid("burst_duration", "must be positive"));
            }
            Some(d) if d > MAX_BURST_DURATION => {
                return Err(BurstError::invalid(
                    "burst_duration",
                    "must not exceed 24 hours",
                ));
            }
            _ => (),
        }
        match self.min_granularity {
            Some(d) if d.is_zero() => {
                return Err(BurstError::invalid("min_granularity", "must be positive"));
            }
            Some(d) if d > MAX_MIN_GRANULARITY => {
                return Err(BurstError::invalid(
                    "min_granularity",
                    "must not exceed 1 second",
                ));
            }
            _ => (),
        }
        Ok(())
    }

    pub fn try_build(self) -> Result<BurstConfig, BurstError> {
        self.validate()?;
        Ok(BurstConfig {
            target_rate: self.target_rate.unwrap_or(DEFAULT_TARGET_RATE),
            payload_size: self.payload_size.unwrap_or(DEFAULT_PAYLOAD_SIZE),
            burst_duration: self.burst_duration.unwrap_or(DEFAULT_BURST_DURATION),
            min_granularity: self.min_granularity.unwrap_or(DEFAULT_MIN_GRANULARITY),
            sink: self.sink.unwrap_or_else(|| Arc::new(StdoutSink::new())),
            payload: self
                .payload
                .unwrap_or_else(|| Arc::new(FillerPayload::default())),
        })
    }
}
