//! Maidenhead grid locator decoding.
//!
//! A locator is a sequence of character pairs, each pair refining the cell
//! described by the previous one:
//!
//! | pair | characters | longitude step | latitude step |
//! |------|------------|----------------|---------------|
//! | field | `A`-`R` | 20° | 10° |
//! | square | `0`-`9` | 2° | 1° |
//! | subsquare | `A`-`X` | 5' | 2.5' |
//! | extended square | `0`-`9` | 30" | 15" |
//!
//! Decoding is case-insensitive.

use serde::Serialize;
use thiserror::Error;

/// Longest locator accepted (field, square, subsquare and extended square).
pub const MAX_LOCATOR_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("locator must have an even length between 2 and {MAX_LOCATOR_LEN}, got {0}")]
    InvalidLength(usize),

    #[error("invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Precision level of one character pair.
#[derive(Clone, Copy)]
struct Pair {
    /// Number of divisions along each axis.
    base: u8,
    /// First character of the pair's alphabet (`'A'` or `'0'`).
    origin: u8,
    lon_step: f64,
    lat_step: f64,
}

const PAIRS: [Pair; 4] = [
    Pair {
        base: 18,
        origin: b'A',
        lon_step: 20.0,
        lat_step: 10.0,
    },
    Pair {
        base: 10,
        origin: b'0',
        lon_step: 2.0,
        lat_step: 1.0,
    },
    Pair {
        base: 24,
        origin: b'A',
        lon_step: 2.0 / 24.0,
        lat_step: 1.0 / 24.0,
    },
    Pair {
        base: 10,
        origin: b'0',
        lon_step: 2.0 / 240.0,
        lat_step: 1.0 / 240.0,
    },
];

/// Decodes a locator into the coordinates of the center of its cell.
pub fn parse_centered(locator: &str) -> Result<LatLon, LocatorError> {
    let bytes = locator.as_bytes();
    let len = locator.chars().count();
    if len != bytes.len() || len < 2 || len > MAX_LOCATOR_LEN || len % 2 != 0 {
        return Err(LocatorError::InvalidLength(len));
    }

    let mut lon = -180.0;
    let mut lat = -90.0;
    let mut last = PAIRS[0];

    for (index, chunk) in bytes.chunks(2).enumerate() {
        let pair = PAIRS[index];
        let position = index * 2;
        lon += f64::from(digit(chunk[0], pair, position)?) * pair.lon_step;
        lat += f64::from(digit(chunk[1], pair, position + 1)?) * pair.lat_step;
        last = pair;
    }

    Ok(LatLon::new(lat + last.lat_step / 2.0, lon + last.lon_step / 2.0))
}

fn digit(byte: u8, pair: Pair, position: usize) -> Result<u8, LocatorError> {
    let value = byte.to_ascii_uppercase().wrapping_sub(pair.origin);
    if value < pair.base {
        Ok(value)
    } else {
        Err(LocatorError::InvalidCharacter {
            ch: byte as char,
            position,
        })
    }
}
