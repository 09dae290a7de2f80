/// Linear interpolation between `start` and `end` at parameter `t`.
///
/// Evaluated as `start * (1 - t) + end * t`, so `t = 0` returns `start` and `t = 1` returns `end`
/// exactly.
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start * (1.0 - t) + end * t
}

/// Clamp `val` into `[min, max]`.
///
/// A NaN `val` clamps to `min`, so non-finite ratios never leak into visual state.
pub fn clamp(val: f64, min: f64, max: f64) -> f64 {
    val.max(min).min(max)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
