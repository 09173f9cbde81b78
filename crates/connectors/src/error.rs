use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The configured endpoint could not be turned into a request URL.
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Building or sending the request failed before a response arrived.
    #[error("Stream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ClickHouse driver error.
    #[error("ClickHouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),
}
