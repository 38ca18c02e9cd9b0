use super::style::Rgb;

// Viridis sampled at nine evenly spaced points; intermediate values are
// interpolated linearly in RGB.
const VIRIDIS_STOPS: [(u8, u8, u8); 9] = [
    (0x44, 0x01, 0x54),
    (0x47, 0x2d, 0x7b),
    (0x3b, 0x52, 0x8b),
    (0x2c, 0x72, 0x8e),
    (0x21, 0x91, 0x8c),
    (0x28, 0xae, 0x80),
    (0x5e, 0xc9, 0x62),
    (0xad, 0xdc, 0x30),
    (0xfd, 0xe7, 0x25),
];

/// Viridis color for `t` in [0, 1]; out-of-range input saturates.
pub fn viridis(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS_STOPS.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    let frac = scaled - lo as f64;
    let (a, b) = (VIRIDIS_STOPS[lo], VIRIDIS_STOPS[lo + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Position of `value` between `vmin` and `vmax`, clamped to [0, 1].
/// A degenerate range maps everything to 0.
pub fn normalize(value: f64, vmin: f64, vmax: f64) -> f64 {
    let span = vmax - vmin;
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((value - vmin) / span).clamp(0.0, 1.0)
}

/// Viridis color of `value` scaled between `vmin` and `vmax`.
pub fn scaled_color(value: f64, vmin: f64, vmax: f64) -> Rgb {
    viridis(normalize(value, vmin, vmax))
}
