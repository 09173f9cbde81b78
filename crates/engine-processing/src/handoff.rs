//! Bounded FIFO queue between the stream reader and the batch writer.
//!
//! A full queue suspends the reader, so a slow sink throttles how fast the
//! stream is consumed. The queue never drops items on its own.

use model::records::report::RawReport;
use std::num::NonZeroUsize;
use tokio::sync::mpsc;

pub type ReportSender = mpsc::Sender<RawReport>;
pub type ReportReceiver = mpsc::Receiver<RawReport>;

pub fn channel(capacity: NonZeroUsize) -> (ReportSender, ReportReceiver) {
    mpsc::channel(capacity.get())
}
