use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("ClickHouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    #[error("No insert was prepared before writing the batch")]
    NotPrepared,

    #[error("Sink error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metrics registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Rendered metrics are not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
