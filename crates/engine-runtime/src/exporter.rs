//! Prometheus `/metrics` endpoint.

use crate::error::ExporterError;
use engine_core::metrics::{CONTENT_TYPE, Metrics};
use std::{net::SocketAddr, time::Duration};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How often the blocking accept loop checks for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MetricsServer {
    server: Server,
    metrics: Metrics,
}

impl MetricsServer {
    pub fn bind(addr: SocketAddr, metrics: Metrics) -> Result<Self, ExporterError> {
        let server = Server::http(addr).map_err(|source| ExporterError::Bind { addr, source })?;
        info!(addr = %addr, "Serving metrics on /metrics");
        Ok(Self { server, metrics })
    }

    /// The bound address, useful when binding to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests on a blocking thread until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::task::spawn_blocking(move || self.serve(&cancel))
    }

    fn serve(&self, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            match self.server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => self.respond(request),
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Metrics listener failed");
                    return;
                }
            }
        }
        debug!("Metrics listener stopped");
    }

    fn respond(&self, request: Request) {
        let path = request.url().split('?').next().unwrap_or_default();
        let response = match (request.method(), path) {
            (Method::Get, "/metrics") => match self.metrics.render() {
                Ok(body) => with_content_type(Response::from_string(body)),
                Err(e) => {
                    warn!(error = %e, "Failed to render metrics");
                    Response::from_string(e.to_string()).with_status_code(StatusCode(500))
                }
            },
            _ => Response::from_string("not found").with_status_code(StatusCode(404)),
        };

        if let Err(e) = request.respond(response) {
            debug!(error = %e, "Metrics client went away");
        }
    }
}

fn with_content_type<R: std::io::Read>(response: Response<R>) -> Response<R> {
    match Header::from_bytes("Content-Type", CONTENT_TYPE) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
