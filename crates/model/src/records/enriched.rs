use chrono::{DateTime, Utc};
use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// A report ready to be stored, with band and path geometry derived.
///
/// Field names match the destination columns. Coordinates are zero when the
/// corresponding locator is absent or invalid; `distance`, `azimuth` and
/// `rx_azimuth` are zero unless both locators decoded.
#[derive(Debug, Clone, Default, PartialEq, Row, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: u64,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub time: DateTime<Utc>,
    pub band: i16,
    pub frequency: u32,
    pub snr: i8,
    pub mode: String,

    pub version: String,

    pub rx_sign: String,
    pub rx_lat: f32,
    pub rx_lon: f32,
    pub rx_loc: String,

    pub tx_sign: String,
    pub tx_lat: f32,
    pub tx_lon: f32,
    pub tx_loc: String,

    pub distance: u16,
    /// Bearing from the sender towards the receiver.
    pub azimuth: u16,
    /// Bearing from the receiver towards the sender.
    pub rx_azimuth: u16,
}
