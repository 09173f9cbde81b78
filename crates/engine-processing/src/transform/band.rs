/// Coarse band code for a frequency in Hz.
///
/// Anything below 300 kHz is `-1`, 300 kHz up to 1 MHz is `0`, and above that
/// the code is the whole number of MHz. This is not a lookup against real
/// band edges: 14.074 MHz and 14.999 MHz both map to `14`.
pub fn band_for(frequency: u32) -> i16 {
    match frequency {
        f if f < 300_000 => -1,
        f if f < 1_000_000 => 0,
        f => (f / 1_000_000) as i16,
    }
}
