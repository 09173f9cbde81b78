//! Great-circle distance and bearings on a spherical earth.

use super::locator::LatLon;
use serde::Serialize;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
pub fn distance_km(from: LatLon, to: LatLon) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial course from `from` towards `to`, in degrees within `[0, 360)`.
///
/// The course back from `to` is generally not the reverse of this one, so
/// each endpoint needs its own call.
pub fn initial_bearing(from: LatLon, to: LatLon) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Rounds a bearing to whole degrees, wrapping 360 back to 0.
pub fn round_bearing(degrees: f64) -> u16 {
    (degrees.rem_euclid(360.0).round() as u16) % 360
}

/// Geometry between a sender and a receiver, rounded the way it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Path {
    /// Great-circle distance in whole kilometers.
    pub distance_km: u16,
    /// Bearing from the sender towards the receiver.
    pub azimuth: u16,
    /// Bearing from the receiver towards the sender.
    pub rx_azimuth: u16,
}

impl Path {
    pub fn between(sender: LatLon, receiver: LatLon) -> Self {
        Self {
            distance_km: distance_km(sender, receiver).round() as u16,
            azimuth: round_bearing(initial_bearing(sender, receiver)),
            rx_azimuth: round_bearing(initial_bearing(receiver, sender)),
        }
    }
}
