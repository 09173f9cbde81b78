//! Turns a raw stream report into a storable row.

use super::{
    band::band_for,
    error::{ConvertError, Station},
};
use chrono::{DateTime, Utc};
use model::{
    geo::{LatLon, LocatorError, Path, parse_centered},
    records::{enriched::EnrichedRecord, report::RawReport},
};

/// Converts `report`, deriving band, coordinates and path geometry.
///
/// Empty locators are not an error. An invalid locator leaves its
/// coordinates and the path at zero and is returned as
/// [`ConvertError::Locator`] holding the rest of the record; the receiver
/// locator is checked first.
pub fn convert(report: &RawReport) -> Result<EnrichedRecord, ConvertError> {
    let frequency = u32::try_from(report.frequency)
        .map_err(|_| ConvertError::Frequency(report.frequency))?;

    let mut record = EnrichedRecord {
        id: report.sequence_number,
        time: flow_start(report.flow_start_seconds)?,
        band: band_for(frequency),
        frequency,
        snr: report.snr.clamp(i8::MIN.into(), i8::MAX.into()) as i8,
        mode: report.mode.clone(),
        version: report.receiver_decoder_software.clone(),
        rx_sign: report.receiver_callsign.clone(),
        rx_loc: report.receiver_locator.clone(),
        tx_sign: report.sender_callsign.clone(),
        tx_loc: report.sender_locator.clone(),
        ..Default::default()
    };

    let receiver = locate(&report.receiver_locator);
    let sender = locate(&report.sender_locator);

    if let Some(Ok(rx)) = receiver {
        record.rx_lat = rx.lat as f32;
        record.rx_lon = rx.lon as f32;
    }
    if let Some(Ok(tx)) = sender {
        record.tx_lat = tx.lat as f32;
        record.tx_lon = tx.lon as f32;
    }

    match (receiver, sender) {
        (Some(Ok(rx)), Some(Ok(tx))) => {
            let path = Path::between(tx, rx);
            record.distance = path.distance_km;
            record.azimuth = path.azimuth;
            record.rx_azimuth = path.rx_azimuth;
            Ok(record)
        }
        (Some(Err(source)), _) => Err(ConvertError::Locator {
            side: Station::Receiver,
            locator: report.receiver_locator.clone(),
            source,
            partial: Box::new(record),
        }),
        (_, Some(Err(source))) => Err(ConvertError::Locator {
            side: Station::Sender,
            locator: report.sender_locator.clone(),
            source,
            partial: Box::new(record),
        }),
        _ => Ok(record),
    }
}

/// `None` for an absent locator.
fn locate(locator: &str) -> Option<Result<LatLon, LocatorError>> {
    (!locator.is_empty()).then(|| parse_centered(locator))
}

/// The destination column holds unsigned 32-bit seconds.
fn flow_start(seconds: i64) -> Result<DateTime<Utc>, ConvertError> {
    u32::try_from(seconds)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s.into(), 0))
        .ok_or(ConvertError::Timestamp(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(receiver_locator: &str, sender_locator: &str) -> RawReport {
        RawReport {
            sequence_number: 41_278_817_362,
            frequency: 14_074_000,
            mode: "FT8".into(),
            snr: -12,
            flow_start_seconds: 1_700_000_000,
            sender_callsign: "SM5XYZ".into(),
            sender_locator: sender_locator.into(),
            receiver_callsign: "K2ABC".into(),
            receiver_locator: receiver_locator.into(),
            receiver_decoder_software: "WSJT-X 2.6.1".into(),
        }
    }

    #[test]
    fn test_full_conversion() {
        let record = convert(&report("FN20", "JO65")).unwrap();

        assert_eq!(record.id, 41_278_817_362);
        assert_eq!(record.time.timestamp(), 1_700_000_000);
        assert_eq!(record.band, 14);
        assert_eq!(record.frequency, 14_074_000);
        assert_eq!(record.snr, -12);
        assert_eq!(record.mode, "FT8");
        assert_eq!(record.version, "WSJT-X 2.6.1");
        assert_eq!(record.rx_sign, "K2ABC");
        assert_eq!(record.tx_sign, "SM5XYZ");
        assert_eq!(record.rx_loc, "FN20");
        assert_eq!(record.tx_loc, "JO65");
        assert_eq!((record.rx_lat, record.rx_lon), (40.5, -75.0));
        assert_eq!((record.tx_lat, record.tx_lon), (55.5, 13.0));

        assert!(record.distance > 0 && record.distance <= 20_000);
        assert!(record.azimuth < 360);
        assert!(record.rx_azimuth < 360);
        assert_ne!(record.azimuth, record.rx_azimuth);
    }

    #[test]
    fn test_empty_sender_locator_is_not_an_error() {
        let record = convert(&report("FN20", "")).unwrap();

        assert_eq!((record.rx_lat, record.rx_lon), (40.5, -75.0));
        assert_eq!((record.tx_lat, record.tx_lon), (0.0, 0.0));
        assert_eq!(record.distance, 0);
        assert_eq!(record.azimuth, 0);
        assert_eq!(record.rx_azimuth, 0);
        assert_eq!(record.tx_sign, "SM5XYZ");
        assert_eq!(record.band, 14);
    }

    #[test]
    fn test_invalid_locator_keeps_partial_record() {
        let err = convert(&report("FN20", "ZZ99")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Locator {
                side: Station::Sender,
                ..
            }
        ));

        let partial = err.into_partial().unwrap();
        assert_eq!((partial.rx_lat, partial.rx_lon), (40.5, -75.0));
        assert_eq!((partial.tx_lat, partial.tx_lon), (0.0, 0.0));
        assert_eq!(partial.distance, 0);
        assert_eq!(partial.tx_loc, "ZZ99");
        assert_eq!(partial.id, 41_278_817_362);
    }

    #[test]
    fn test_receiver_locator_error_reported_first() {
        let err = convert(&report("FN2", "ZZ99")).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Locator {
                side: Station::Receiver,
                source: LocatorError::InvalidLength(3),
                ..
            }
        ));
    }

    #[test]
    fn test_snr_saturates() {
        let mut raw = report("", "");
        raw.snr = -300;
        assert_eq!(convert(&raw).unwrap().snr, i8::MIN);
        raw.snr = 1_000;
        assert_eq!(convert(&raw).unwrap().snr, i8::MAX);
    }

    #[test]
    fn test_unrepresentable_values_are_rejected() {
        let mut raw = report("", "");
        raw.frequency = -1;
        assert!(matches!(convert(&raw), Err(ConvertError::Frequency(-1))));

        let mut raw = report("", "");
        raw.flow_start_seconds = -5;
        let err = convert(&raw).unwrap_err();
        assert!(matches!(err, ConvertError::Timestamp(-5)));
        assert!(err.into_partial().is_none());
    }

    #[test]
    fn test_band_follows_frequency() {
        let mut raw = report("", "");
        raw.frequency = 1_000;
        assert_eq!(convert(&raw).unwrap().band, -1);
        raw.frequency = 500_000;
        assert_eq!(convert(&raw).unwrap().band, 0);
    }
}
