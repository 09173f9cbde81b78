pub mod geodesic;
pub mod locator;

pub use geodesic::{Path, distance_km, initial_bearing};
pub use locator::{LatLon, LocatorError, parse_centered};
