use super::{error::SettingsError, *};
use reqwest::Url;
use std::{collections::HashMap, num::NonZeroUsize, str::FromStr, time::Duration};

/// Collects settings from a variable map and command-line overrides, then
/// validates them once in [`SettingsBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct SettingsBuilder {
    stream_url: Option<String>,
    stream_token: Option<Secret>,
    clickhouse_url: Option<String>,
    clickhouse_db: Option<String>,
    clickhouse_username: Option<String>,
    clickhouse_password: Option<Secret>,
    clickhouse_table: Option<String>,
    flush_interval: Option<Duration>,
    queue_capacity: Option<usize>,
    metrics_interval: Option<Duration>,
    metrics_port: Option<u16>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every known `PSKHOUSE_*` key. Empty values count as unset.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let text = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            stream_url: text(STREAM_URL),
            stream_token: text(STREAM_TOKEN).map(Secret::new),
            clickhouse_url: text(CLICKHOUSE_URL),
            clickhouse_db: text(CLICKHOUSE_DB),
            clickhouse_username: text(CLICKHOUSE_USERNAME),
            clickhouse_password: vars.get(CLICKHOUSE_PASSWORD).map(Secret::new),
            clickhouse_table: text(CLICKHOUSE_TABLE),
            flush_interval: parse_number::<u64>(vars, FLUSH_INTERVAL_MS)?
                .map(Duration::from_millis),
            queue_capacity: parse_number(vars, QUEUE_CAPACITY)?,
            metrics_interval: parse_number::<u64>(vars, METRICS_INTERVAL_SECS)?
                .map(Duration::from_secs),
            metrics_port: parse_number(vars, METRICS_PORT)?,
        })
    }

    pub fn stream_token(mut self, token: impl Into<String>) -> Self {
        self.stream_token = Some(Secret::new(token));
        self
    }

    pub fn clickhouse_url(mut self, url: impl Into<String>) -> Self {
        self.clickhouse_url = Some(url.into());
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = Some(port);
        self
    }

    pub fn build(self) -> Result<Settings, SettingsError> {
        let token = self
            .stream_token
            .filter(|t| !t.is_empty())
            .ok_or(SettingsError::Missing(STREAM_TOKEN))?;

        let stream_url = self
            .stream_url
            .unwrap_or_else(|| DEFAULT_STREAM_URL.to_string());
        check_url(STREAM_URL, &stream_url)?;

        let clickhouse_url = self
            .clickhouse_url
            .unwrap_or_else(|| DEFAULT_CLICKHOUSE_URL.to_string());
        check_url(CLICKHOUSE_URL, &clickhouse_url)?;

        let flush_interval = self.flush_interval.unwrap_or(DEFAULT_FLUSH_INTERVAL);
        if flush_interval.is_zero() {
            return Err(SettingsError::Zero {
                key: FLUSH_INTERVAL_MS,
            });
        }

        let queue_capacity =
            NonZeroUsize::new(self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)).ok_or(
                SettingsError::Zero {
                    key: QUEUE_CAPACITY,
                },
            )?;

        let metrics_interval = Some(self.metrics_interval.unwrap_or(DEFAULT_METRICS_INTERVAL))
            .filter(|interval| !interval.is_zero());

        let metrics_port =
            Some(self.metrics_port.unwrap_or(DEFAULT_METRICS_PORT)).filter(|&port| port != 0);

        Ok(Settings {
            stream: StreamSettings {
                url: stream_url,
                token,
            },
            clickhouse: ClickHouseSettings {
                url: clickhouse_url,
                database: self
                    .clickhouse_db
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_DB.to_string()),
                username: self
                    .clickhouse_username
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_USERNAME.to_string()),
                password: self.clickhouse_password.unwrap_or_default(),
                table: self
                    .clickhouse_table
                    .unwrap_or_else(|| DEFAULT_CLICKHOUSE_TABLE.to_string()),
            },
            flush_interval,
            queue_capacity,
            metrics_interval,
            metrics_port,
        })
    }
}

fn parse_number<T>(
    vars: &HashMap<String, String>,
    key: &'static str,
) -> Result<Option<T>, SettingsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e: T::Err| SettingsError::InvalidValue {
                key,
                value: value.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), SettingsError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
