use std::{
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    time::Duration,
};

pub mod builder;
pub mod error;
pub mod secret;

pub use builder::SettingsBuilder;
pub use secret::Secret;

pub const STREAM_URL: &str = "PSKHOUSE_STREAM_URL";
pub const STREAM_TOKEN: &str = "PSKHOUSE_STREAM_TOKEN";
pub const CLICKHOUSE_URL: &str = "PSKHOUSE_CLICKHOUSE_URL";
pub const CLICKHOUSE_DB: &str = "PSKHOUSE_CLICKHOUSE_DB";
pub const CLICKHOUSE_USERNAME: &str = "PSKHOUSE_CLICKHOUSE_USERNAME";
pub const CLICKHOUSE_PASSWORD: &str = "PSKHOUSE_CLICKHOUSE_PASSWORD";
pub const CLICKHOUSE_TABLE: &str = "PSKHOUSE_CLICKHOUSE_TABLE";
pub const FLUSH_INTERVAL_MS: &str = "PSKHOUSE_FLUSH_INTERVAL_MS";
pub const QUEUE_CAPACITY: &str = "PSKHOUSE_QUEUE_CAPACITY";
pub const METRICS_INTERVAL_SECS: &str = "PSKHOUSE_METRICS_INTERVAL_SECS";
pub const METRICS_PORT: &str = "PSKHOUSE_METRICS_PORT";

pub const DEFAULT_STREAM_URL: &str = "https://stream.pskreporter.info/stream/report";
pub const DEFAULT_CLICKHOUSE_URL: &str = "http://127.0.0.1:8123";
pub const DEFAULT_CLICKHOUSE_DB: &str = "pskhouse";
pub const DEFAULT_CLICKHOUSE_USERNAME: &str = "pskhouse";
pub const DEFAULT_CLICKHOUSE_TABLE: &str = "rx";
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_METRICS_PORT: u16 = 9001;

/// Where reports are pulled from.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub url: String,
    pub token: Secret,
}

/// Where enriched rows are written to.
#[derive(Debug, Clone)]
pub struct ClickHouseSettings {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: Secret,
    pub table: String,
}

/// Immutable configuration shared read-only by every pipeline task.
#[derive(Debug, Clone)]
pub struct Settings {
    pub stream: StreamSettings,
    pub clickhouse: ClickHouseSettings,
    /// Period of the batch flush timer.
    pub flush_interval: Duration,
    /// Bound of the queue between the stream reader and the batch writer.
    pub queue_capacity: NonZeroUsize,
    /// Period of the telemetry report, `None` when periodic reports are off.
    pub metrics_interval: Option<Duration>,
    /// Port of the `/metrics` listener, `None` when the exporter is off.
    pub metrics_port: Option<u16>,
}

impl Settings {
    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    pub fn queue_capacity(&self) -> NonZeroUsize {
        self.queue_capacity
    }

    pub fn metrics_interval(&self) -> Option<Duration> {
        self.metrics_interval
    }

    /// Address the metrics exporter listens on, on every interface.
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_port
            .map(|port| SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }
}
