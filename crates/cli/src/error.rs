use connectors::error::ConnectorError;
use engine_config::SettingsError;
use engine_core::error::MetricsError;
use engine_runtime::error::{ExporterError, PipelineError};
use model::geo::LocatorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Pipeline stopped: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Metrics exporter error: {0}")]
    Exporter(#[from] ExporterError),

    #[error("Invalid locator: {0}")]
    Locator(#[from] LocatorError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
