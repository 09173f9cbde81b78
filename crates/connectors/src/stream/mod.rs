use futures_util::Stream;
pub use reqwest::StatusCode;
use std::pin::Pin;
use tokio_util::codec::LinesCodecError;

pub mod client;

pub use client::StreamClient;

/// Upper bound for a single report line. Longer lines are skipped by the
/// framing layer and surface as [`LinesCodecError::MaxLineLengthExceeded`].
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Newline-delimited body of an open stream, without the line terminators.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String, LinesCodecError>> + Send>>;

/// An open connection to the report stream.
pub struct StreamResponse {
    pub status: StatusCode,
    pub lines: LineStream,
}

impl StreamResponse {
    pub fn new(status: StatusCode, lines: LineStream) -> Self {
        Self { status, lines }
    }
}
