use crate::{
    error::ConnectorError,
    stream::{MAX_LINE_LENGTH, StreamResponse},
};
use futures_util::TryStreamExt;
use reqwest::Url;
use std::time::Duration;
use tokio_util::{
    codec::{FramedRead, LinesCodec},
    io::StreamReader,
};
use tracing::debug;

const USER_AGENT: &str = concat!("pskhouse/", env!("CARGO_PKG_VERSION"));

/// HTTP client for a long-lived newline-delimited JSON stream.
///
/// Every call to [`StreamClient::open`] issues a fresh GET; the body is read
/// for as long as the remote keeps the connection open.
#[derive(Clone)]
pub struct StreamClient {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl StreamClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, ConnectorError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConnectorError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        // No overall timeout: the body is expected to stay open indefinitely.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(ConnectorError::ClientBuild)?;

        Ok(Self {
            client,
            endpoint,
            token: token.to_string(),
        })
    }

    /// Endpoint with the access token attached as the `token` query parameter.
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", &self.token);
        url
    }

    /// Issues the GET request and frames the response body into lines.
    ///
    /// The status is returned as received; deciding what a non-success
    /// status means is up to the caller.
    pub async fn open(&self) -> Result<StreamResponse, ConnectorError> {
        debug!(endpoint = %self.endpoint, "Opening report stream");

        let response = self.client.get(self.request_url()).send().await?;
        let status = response.status();

        let body = response.bytes_stream().map_err(std::io::Error::other);
        let lines = FramedRead::new(
            StreamReader::new(body),
            LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
        );

        Ok(StreamResponse::new(status, Box::pin(lines)))
    }
}
