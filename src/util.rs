/// Rounds to two decimals the way the value is displayed: the exact binary
/// value decides, so `2.455` becomes `2.46` but `1.005` becomes `1.00`.
pub fn round_to_hundredths(value: f64) -> f64 {
    format_seconds(value).parse().unwrap_or(value)
}

/// Two-decimal rendering used for elapsed times, e.g. `2.46`
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.2}", seconds)
}

/// Cheap deterministic hash of a cell position, used for stable backdrops
pub fn cell_noise(x: u16, y: u16, salt: u32) -> u32 {
    let mut h = (x as u32)
        .wrapping_mul(0x9E37_79B1)
        .wrapping_add((y as u32).wrapping_mul(0x85EB_CA77))
        ^ salt.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h
}
