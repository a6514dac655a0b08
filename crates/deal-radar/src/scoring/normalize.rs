/// Linearly maps `value` from `[min, max]` onto `[0, 1]`, saturating outside
/// the window. Absent or non-finite values, and a degenerate window, yield 0.
pub fn normalize(value: Option<f64>, min: f64, max: f64) -> f64 {
    let Some(value) = value.filter(|value| value.is_finite()) else {
        return 0.0;
    };
    if max == min {
        return 0.0;
    }
    clip_unit((value - min) / (max - min))
}

/// Clamps into `[0, 1]`; NaN collapses to 0.
pub fn clip_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
