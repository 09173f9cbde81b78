use engine_processing::error::{ConsumerError, ProducerError};
use std::net::SocketAddr;
use thiserror::Error;

/// Fatal causes that end the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stream reader failed: {0}")]
    Producer(#[from] ProducerError),

    #[error("Batch writer failed: {0}")]
    Consumer(#[from] ConsumerError),

    /// A stage task panicked or was aborted.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
