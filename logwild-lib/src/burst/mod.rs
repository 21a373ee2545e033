//! Rate controlled log bursts.
//!
//! A [`BurstConfig`] is turned into a [`Schedule`] by [`compute_schedule`],
//! which a [`BurstRunner`] executes as one task on an injected executor.
//! The [`BurstHandle`] returned by [`BurstRunner::start`] resolves into a
//! [`BurstResult`] once the burst duration elapsed, from which a
//! serializable [`BurstReport`] can be rendered.

mod config;
mod error;
mod runner;
mod schedule;
mod stats;

pub use self::{
    config::{
        BurstConfig, BurstConfigBuilder, DEFAULT_BURST_DURATION, DEFAULT_PAYLOAD_SIZE,
        DEFAULT_TARGET_RATE, MAX_BURST_DURATION, MAX_MIN_GRANULARITY, MAX_PAYLOAD_SIZE,
        MAX_TARGET_RATE,
    },
    error::BurstError,
    runner::{BurstHandle, BurstRunner},
    schedule::{DEFAULT_MIN_GRANULARITY, Schedule, compute_schedule},
    stats::{BurstReport, BurstResult, report},
};
