use connectors::{error::ConnectorError, stream::StatusCode};
use engine_core::error::SinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Failed to connect to report stream: {0}")]
    Connect(#[from] ConnectorError),

    #[error("Report stream answered with status {0}")]
    Status(StatusCode),

    #[error("The report queue was closed unexpectedly")]
    QueueClosed,
}

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Failed to prepare sink: {0}")]
    Prepare(#[source] SinkError),

    #[error("Failed to flush batch '{batch_id}' ({rows} rows): {source}")]
    Flush {
        batch_id: String,
        rows: usize,
        #[source]
        source: SinkError,
    },
}
