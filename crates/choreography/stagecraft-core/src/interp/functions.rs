//! Interpolation helpers shared by tweens and scrub tracks.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` inside `[start, end]`, clamped to [0, 1].
/// A degenerate span acts as a step at `start`.
#[inline]
pub fn inverse_lerp_clamped(start: f32, end: f32, value: f32) -> f32 {
    let span = end - start;
    if span.abs() <= f32::EPSILON {
        return if value >= start { 1.0 } else { 0.0 };
    }
    ((value - start) / span).clamp(0.0, 1.0)
}

/// Normalized phase of a ping-pong cycle: elapsed time over `period` folds into
/// 0→1→0 every `2 * period`.
#[inline]
pub fn yoyo_phase(elapsed: f64, period: f64) -> f32 {
    if period <= 0.0 {
        return 0.0;
    }
    let cycle = (elapsed / period).max(0.0);
    let whole = cycle.floor();
    let frac = (cycle - whole) as f32;
    if (whole as u64) % 2 == 0 {
        frac
    } else {
        1.0 - frac
    }
}
