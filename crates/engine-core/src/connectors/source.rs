use async_trait::async_trait;
use connectors::{
    error::ConnectorError,
    stream::{StreamClient, StreamResponse},
};

/// Where reception reports come from.
///
/// Each call to [`ReportSource::open`] establishes a new connection; the
/// previous one, if any, has already been dropped by the caller.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn open(&self) -> Result<StreamResponse, ConnectorError>;
}

#[async_trait]
impl ReportSource for StreamClient {
    async fn open(&self) -> Result<StreamResponse, ConnectorError> {
        StreamClient::open(self).await
    }
}
