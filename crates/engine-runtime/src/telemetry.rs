//! Periodic log report of the pipeline counters.

use engine_core::metrics::{Metrics, MetricsSnapshot};
use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub fn spawn_reporter(
    metrics: Metrics,
    interval: Option<Duration>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_reporter(metrics, interval, cancel))
}

/// Logs a snapshot every `interval` until cancelled, then a final one.
pub async fn run_reporter(metrics: Metrics, interval: Option<Duration>, cancel: CancellationToken) {
    if let Some(period) = interval {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => log_snapshot(&metrics.snapshot(), false),
            }
        }
    } else {
        cancel.cancelled().await;
    }

    log_snapshot(&metrics.snapshot(), true);
}

fn log_snapshot(snapshot: &MetricsSnapshot, last: bool) {
    info!(
        lines_read = snapshot.lines_read,
        invalid_lines = snapshot.invalid_lines,
        batches_sent = snapshot.batches_sent,
        rows_sent = snapshot.rows_sent,
        convert_errors = snapshot.convert_errors,
        insert_errors = snapshot.insert_errors,
        status_codes = ?snapshot.status_codes,
        "{}",
        if last { "Final pipeline metrics" } else { "Pipeline metrics" }
    );
}
