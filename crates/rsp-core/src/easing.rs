//! Easing curves

/// Overshoot constant of the classic back easing
pub const BACK_OVERSHOOT: f64 = 1.70158;

/// Ease-in-back: `n² · ((s + 1)·n − s)`
///
/// Dips slightly below zero before accelerating to 1.0 at `n = 1`.
/// Input is not clamped; callers decide how to treat `n` outside `[0, 1]`.
#[inline]
pub fn ease_in_back(n: f64) -> f64 {
    let s = BACK_OVERSHOOT;
    n * n * ((s + 1.0) * n - s)
}
