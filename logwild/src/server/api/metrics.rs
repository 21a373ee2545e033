use std::{
    fmt::Write as _,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use rama::http::{
    headers::ContentType,
    service::web::{
        extract::State,
        response::{Headers, IntoResponse},
    },
};

use super::AppState;

/// Process wide loggen counters, exposed in the Prometheus text format.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    bursts_started: AtomicU64,
    bursts_failed: AtomicU64,
    events_emitted: AtomicU64,
}

impl Metrics {
    pub fn record_started(&self) {
        self.counters.bursts_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_finished(&self, emitted: u64, failed: bool) {
        self.counters
            .events_emitted
            .fetch_add(emitted, Ordering::Relaxed);
        if failed {
            self.counters.bursts_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, help, counter) in [
            (
                "logwild_bursts_started_total",
                "Bursts started through the loggen endpoint.",
                &self.counters.bursts_started,
            ),
            (
                "logwild_bursts_failed_total",
                "Bursts that did not complete successfully.",
                &self.counters.bursts_failed,
            ),
            (
                "logwild_events_emitted_total",
                "Log entries written to the sink.",
                &self.counters.events_emitted,
            ),
        ] {
            let _ = writeln!(out, "# HELP {name} {help}");
            let _ = writeln!(out, "# TYPE {name} counter");
            let _ = writeln!(out, "{name} {}", counter.load(Ordering::Relaxed));
        }
        out
    }
}

pub(super) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (Headers::single(ContentType::text_utf8()), state.metrics.render())
}
