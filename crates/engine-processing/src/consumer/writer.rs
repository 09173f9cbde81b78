use crate::{error::ConsumerError, handoff::ReportReceiver, transform::convert};
use engine_core::{connectors::sink::Sink, metrics::Metrics};
use model::records::{batch::Batch, enriched::EnrichedRecord, report::RawReport};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Converts queued reports and flushes them to the sink on a fixed timer.
///
/// Flushes are driven only by the timer, never by batch size, and an empty
/// batch is never sent. A failed flush or a failed prepare ends the writer
/// with an error. On cancellation the pending batch gets one last attempt
/// whose failure is only logged.
pub struct BatchWriter<S> {
    rx: ReportReceiver,
    sink: S,
    metrics: Metrics,
    cancel: CancellationToken,
    flush_interval: Duration,
    batch: Batch<EnrichedRecord>,
}

impl<S: Sink<EnrichedRecord>> BatchWriter<S> {
    pub fn new(
        rx: ReportReceiver,
        sink: S,
        metrics: Metrics,
        cancel: CancellationToken,
        flush_interval: Duration,
    ) -> Self {
        Self {
            rx,
            sink,
            metrics,
            cancel,
            flush_interval,
            batch: Batch::new(),
        }
    }

    pub async fn run(&mut self) -> Result<(), ConsumerError> {
        self.sink.prepare().await.map_err(ConsumerError::Prepare)?;

        let mut ticker = interval_at(Instant::now() + self.flush_interval, self.flush_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Cancellation requested. Stopping batch writer.");
                    break;
                }
                _ = ticker.tick() => self.flush().await?,
                received = self.rx.recv() => match received {
                    Some(report) => self.append(&report),
                    None => {
                        info!("Report queue closed. Stopping batch writer.");
                        break;
                    }
                },
            }
        }

        self.final_flush().await;
        Ok(())
    }

    fn append(&mut self, report: &RawReport) {
        match convert(report) {
            Ok(record) => self.batch.push(record),
            Err(e) => {
                self.metrics.increment_convert_errors(1);
                warn!(seq = report.sequence_number, error = %e, "Failed to convert report");
                if let Some(partial) = e.into_partial() {
                    self.batch.push(partial);
                }
            }
        }
    }

    async fn flush(&mut self) -> Result<(), ConsumerError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = self.batch.take();
        let rows = batch.len();
        self.sink
            .write_batch(batch.rows)
            .await
            .map_err(|source| {
                self.metrics.increment_insert_errors(1);
                ConsumerError::Flush {
                    batch_id: batch.id.clone(),
                    rows,
                    source,
                }
            })?;

        self.metrics.record_batch(rows as u64);
        debug!(batch_id = %batch.id, rows, "Batch flushed");

        self.sink.prepare().await.map_err(ConsumerError::Prepare)
    }

    async fn final_flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        let batch = self.batch.take();
        let rows = batch.len();
        match self.sink.write_batch(batch.rows).await {
            Ok(()) => {
                self.metrics.record_batch(rows as u64);
                info!(batch_id = %batch.id, rows, "Final batch flushed");
            }
            Err(e) => {
                self.metrics.increment_insert_errors(1);
                error!(batch_id = %batch.id, rows, error = %e, "Final flush failed");
            }
        }
    }
}
