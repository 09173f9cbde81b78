use serde::{Deserialize, Deserializer, Serialize};

/// One reception report as published on the stream.
///
/// Unknown fields are ignored. Missing and `null` fields fall back to their
/// zero value, so only structurally broken lines or mistyped values fail to
/// decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawReport {
    #[serde(deserialize_with = "null_as_default")]
    pub sequence_number: u64,
    /// Frequency in Hz.
    #[serde(deserialize_with = "null_as_default")]
    pub frequency: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
    /// Signal-to-noise ratio in dB.
    #[serde(rename = "sNR", deserialize_with = "null_as_default")]
    pub snr: i64,
    /// Start of the reception, Unix seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub flow_start_seconds: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub sender_callsign: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sender_locator: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver_callsign: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver_locator: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receiver_decoder_software: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawReport {
    /// Decodes a single stream line.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
