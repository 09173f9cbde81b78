use crate::error::CliError;
use async_trait::async_trait;
use connectors::clickhouse::ClickHouseClient;
use engine_config::settings::ClickHouseSettings;
use tracing::{error, info};

/// Trait for "pinging" a data store
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

pub struct ClickHousePinger {
    pub settings: ClickHouseSettings,
}

#[async_trait]
impl ConnectionPinger for ClickHousePinger {
    async fn ping(&self) -> Result<(), CliError> {
        let settings = &self.settings;
        info!(url = %settings.url, database = %settings.database, "Pinging ClickHouse");

        let client = ClickHouseClient::new(
            &settings.url,
            &settings.database,
            &settings.username,
            settings.password.expose(),
        );
        client.ping().await.map_err(|e| {
            error!(url = %settings.url, error = %e, "ClickHouse ping failed");
            CliError::Connector(e)
        })?;

        info!(url = %settings.url, "ClickHouse ping succeeded");
        Ok(())
    }
}
