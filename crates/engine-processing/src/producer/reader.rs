use crate::{error::ProducerError, handoff::ReportSender};
use connectors::stream::LineStream;
use engine_core::{connectors::source::ReportSource, metrics::Metrics};
use futures::StreamExt;
use model::records::report::RawReport;
use tokio_util::{codec::LinesCodecError, sync::CancellationToken};
use tracing::{debug, info, warn};

enum StreamEnd {
    /// The remote closed the connection, or it broke mid-read.
    Closed,
    Cancelled,
}

/// Pulls reports off the stream and pushes them into the hand-off queue.
///
/// Reconnects immediately whenever the remote closes the connection. A failed
/// connection attempt or a non-success status ends the reader with an error.
pub struct StreamReader<S> {
    source: S,
    tx: ReportSender,
    metrics: Metrics,
    cancel: CancellationToken,
}

impl<S: ReportSource> StreamReader<S> {
    pub fn new(source: S, tx: ReportSender, metrics: Metrics, cancel: CancellationToken) -> Self {
        Self {
            source,
            tx,
            metrics,
            cancel,
        }
    }

    pub async fn run(&mut self) -> Result<(), ProducerError> {
        let mut connections = 0u64;

        loop {
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Cancellation requested. Stopping stream reader.");
                    return Ok(());
                }
                opened = self.source.open() => opened?,
            };

            self.metrics.record_status(response.status.as_u16());
            if !response.status.is_success() {
                return Err(ProducerError::Status(response.status));
            }

            connections += 1;
            info!(connection = connections, status = %response.status, "Connected to report stream");

            let mut lines = response.lines;
            match self.pump(&mut lines).await? {
                StreamEnd::Cancelled => {
                    info!("Cancellation requested. Stopping stream reader.");
                    return Ok(());
                }
                StreamEnd::Closed => {
                    warn!(connection = connections, "Report stream ended, reconnecting");
                }
            }
        }
    }

    async fn pump(&self, lines: &mut LineStream) -> Result<StreamEnd, ProducerError> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                next = lines.next() => next,
            };

            let line = match next {
                None => return Ok(StreamEnd::Closed),
                Some(Ok(line)) => line,
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    self.metrics.increment_lines_read(1);
                    self.metrics.increment_invalid_lines(1);
                    warn!("Skipping oversized report line");
                    continue;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    warn!(error = %e, "Report stream read failed");
                    return Ok(StreamEnd::Closed);
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            self.metrics.increment_lines_read(1);

            let report = match RawReport::from_line(&line) {
                Ok(report) => report,
                Err(e) => {
                    self.metrics.increment_invalid_lines(1);
                    warn!(error = %e, line = %line, "Skipping malformed report line");
                    continue;
                }
            };
            debug!(seq = report.sequence_number, "Decoded report");

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                sent = self.tx.send(report) => {
                    if sent.is_err() {
                        return Err(ProducerError::QueueClosed);
                    }
                }
            }
        }
    }
}
