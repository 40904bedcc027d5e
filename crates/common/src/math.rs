/// Map `x` from the range `[lo, hi]` onto `[-1, 1]`, clamping outside values.
///
/// Used for zoom damping and scroll-speed scaling. A degenerate range
/// (`lo == hi`) maps everything to `0.0`.
pub fn normalize(x: f32, lo: f32, hi: f32) -> f32 {
    let mid = (lo + hi) / 2.0;
    let half = (hi - lo) / 2.0;
    if half == 0.0 || !half.is_finite() {
        return 0.0;
    }
    ((x - mid) / half).clamp(-1.0, 1.0)
}
